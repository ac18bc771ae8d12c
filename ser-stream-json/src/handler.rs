//! Per-type JSON strategies.
//!
//! Every type that can be written implements [`JsonSave`], every type that can
//! be read implements [`JsonLoad`]. Numbers, strings, sequences, string-keyed
//! maps and pairs are covered here. User records implement both traits by
//! hand, usually with [`ObjectReadHelper`](crate::ObjectReadHelper) on the
//! reading side.
use alloc::{
    boxed::Box,
    collections::{BTreeMap, LinkedList, VecDeque},
    string::String,
    vec::Vec
};

use crate::{de, ser, Reader, SerRead, SerWrite, Writer};

/// A type that can be written as JSON.
pub trait JsonSave {
    /// `true` for types written as a bare number or boolean.
    ///
    /// Sequences of scalars are kept on a single line while they are short.
    const SCALAR: bool = false;

    /// Write `self` as a single JSON value.
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error>;
}

/// A type that can be read from JSON in place.
///
/// Reading overwrites the destination, containers are cleared first.
pub trait JsonLoad {
    /// Read a single JSON value into `self`.
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error>;
}

macro_rules! impl_numeric {
    ($($ty:ty),*) => {$(
        impl JsonSave for $ty {
            const SCALAR: bool = true;

            #[inline]
            fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
                writer.write_number(*self)
            }
        }

        impl JsonLoad for $ty {
            #[inline]
            fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
                reader.read_number(self)
            }
        }
    )*};
}

impl_numeric!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, bool);

impl JsonSave for str {
    #[inline]
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        writer.write_string(self)
    }
}

impl JsonSave for String {
    #[inline]
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        writer.write_string(self)
    }
}

impl JsonLoad for String {
    #[inline]
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        reader.read_string(self)
    }
}

impl<T: JsonSave + ?Sized> JsonSave for &T {
    const SCALAR: bool = T::SCALAR;

    #[inline]
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        (**self).save(writer)
    }
}

impl<T: JsonSave + ?Sized> JsonSave for Box<T> {
    const SCALAR: bool = T::SCALAR;

    #[inline]
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        (**self).save(writer)
    }
}

impl<T: JsonLoad + ?Sized> JsonLoad for Box<T> {
    #[inline]
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        (**self).load(reader)
    }
}

fn save_sequence<'a, W, T, I>(writer: &mut Writer<W>, items: I) -> ser::Result<(), W::Error>
    where W: SerWrite,
          T: JsonSave + 'a,
          I: ExactSizeIterator<Item=&'a T>
{
    let multi_line = writer.layout().sequence_multi_line(items.len(), T::SCALAR);
    writer.begin_array(multi_line)?;
    for item in items {
        writer.write_array_item(item)?;
    }
    writer.end_array()
}

fn load_sequence<R, T, F>(reader: &mut Reader<R>, mut push: F) -> de::Result<(), R::Error>
    where R: SerRead,
          T: JsonLoad + Default,
          F: FnMut(T)
{
    reader.begin_array()?;
    while reader.next_array_item()? {
        push(reader.read_value()?);
    }
    Ok(())
}

impl<T: JsonSave> JsonSave for [T] {
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        save_sequence(writer, self.iter())
    }
}

impl<T: JsonSave, const N: usize> JsonSave for [T; N] {
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        save_sequence(writer, self.iter())
    }
}

macro_rules! impl_sequence {
    ($($coll:ident::$push:ident),*) => {$(
        impl<T: JsonSave> JsonSave for $coll<T> {
            fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
                save_sequence(writer, self.iter())
            }
        }

        impl<T: JsonLoad + Default> JsonLoad for $coll<T> {
            fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
                self.clear();
                load_sequence(reader, |item| self.$push(item))
            }
        }
    )*};
}

impl_sequence!(Vec::push, VecDeque::push_back, LinkedList::push_back);

fn save_map<'a, W, V, I>(writer: &mut Writer<W>, entries: I) -> ser::Result<(), W::Error>
    where W: SerWrite,
          V: JsonSave + 'a,
          I: ExactSizeIterator<Item=(&'a String, &'a V)>
{
    let multi_line = writer.layout().map_multi_line(entries.len());
    writer.begin_object(multi_line)?;
    for (key, value) in entries {
        writer.write_object_key_value(key, value)?;
    }
    writer.end_object()
}

fn load_map<R, V, F>(reader: &mut Reader<R>, mut insert: F) -> de::Result<(), R::Error>
    where R: SerRead,
          V: JsonLoad + Default,
          F: FnMut(String, V)
{
    let mut key = String::new();
    reader.begin_object()?;
    while reader.next_object_item(&mut key)? {
        let value = reader.read_value()?;
        insert(core::mem::take(&mut key), value);
    }
    Ok(())
}

impl<V: JsonSave> JsonSave for BTreeMap<String, V> {
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        save_map(writer, self.iter())
    }
}

/// Later occurrences of the same key overwrite earlier ones.
impl<V: JsonLoad + Default> JsonLoad for BTreeMap<String, V> {
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        self.clear();
        load_map(reader, |key, value| { self.insert(key, value); })
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<V: JsonSave, S> JsonSave for std::collections::HashMap<String, V, S> {
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        save_map(writer, self.iter())
    }
}

/// Later occurrences of the same key overwrite earlier ones.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<V, S> JsonLoad for std::collections::HashMap<String, V, S>
    where V: JsonLoad + Default,
          S: core::hash::BuildHasher
{
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        self.clear();
        load_map(reader, |key, value| { self.insert(key, value); })
    }
}

/// A pair is always written on a single line.
impl<K: JsonSave, V: JsonSave> JsonSave for (K, V) {
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        writer.begin_array(false)?;
        writer.write_array_item(&self.0)?;
        writer.write_array_item(&self.1)?;
        writer.end_array()
    }
}

impl<K: JsonLoad, V: JsonLoad> JsonLoad for (K, V) {
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        reader.begin_array()?;
        if !reader.next_array_item()? {
            return Err(de::Error::PairLength { line: reader.line() })
        }
        reader.read(&mut self.0)?;
        if !reader.next_array_item()? {
            return Err(de::Error::PairLength { line: reader.line() })
        }
        reader.read(&mut self.1)?;
        if reader.next_array_item()? {
            return Err(de::Error::PairLength { line: reader.line() })
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, string::ToString};
    use crate::{from_str, to_string};
    use super::*;

    #[test]
    fn test_scalar_flags() {
        assert!(<u8 as JsonSave>::SCALAR);
        assert!(<f64 as JsonSave>::SCALAR);
        assert!(<bool as JsonSave>::SCALAR);
        assert!(<&i32 as JsonSave>::SCALAR);
        assert!(!<String as JsonSave>::SCALAR);
        assert!(!<Vec<u8> as JsonSave>::SCALAR);
        assert!(!<(u8, u8) as JsonSave>::SCALAR);
    }

    #[test]
    fn test_sequences() {
        let v: Vec<i32> = from_str("[1, 2, 3]").unwrap();
        assert_eq!(v, [1, 2, 3]);
        let v: VecDeque<String> = from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(v, ["a", "b"]);
        let v: LinkedList<u8> = from_str("[]").unwrap();
        assert!(v.is_empty());
        let dq: VecDeque<u8> = [1, 2].into_iter().collect();
        assert_eq!(to_string(&dq).unwrap(), "[1, 2]");
        let ll: LinkedList<bool> = [true].into_iter().collect();
        assert_eq!(to_string(&ll).unwrap(), "[true]");
        let slice: &[u8] = &[7, 8];
        assert_eq!(to_string(slice).unwrap(), "[7, 8]");
    }

    #[test]
    fn test_load_clears_containers() {
        let mut reader = Reader::new(crate::SliceReader::new(b"[3]"));
        let mut v = vec![1, 2];
        reader.read(&mut v).unwrap();
        assert_eq!(v, [3]);
        let mut reader = Reader::new(crate::SliceReader::new(br#"{"b": 2}"#));
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1);
        reader.read(&mut map).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["b"], 2);
    }

    #[test]
    fn test_maps() {
        let map: BTreeMap<String, i32> = from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 3);
        assert_eq!(map["b"], 2);
        let map: BTreeMap<String, Vec<u8>> = from_str("{}").unwrap();
        assert!(map.is_empty());
        assert_eq!(from_str::<BTreeMap<String, u8>>("[]"),
            Err(de::Error::Unexpected { expected: "`'{'`", found: Some(b'['), line: 0 }));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_hash_map() {
        use std::collections::HashMap;
        let map: HashMap<String, f64> = from_str(r#"{"pi": 3.5, "e": 2.5, "pi": 3.25}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["pi"], 3.25);
        let mut single = HashMap::new();
        single.insert("k".to_string(), vec![1u8]);
        assert_eq!(to_string(&single).unwrap(), r#"{ "k": [1]}"#);
    }

    #[test]
    fn test_pairs() {
        let pair: (String, u32) = from_str(r#"["x", 5]"#).unwrap();
        assert_eq!(pair, ("x".to_string(), 5));
        let pairs: Vec<(u8, bool)> = from_str("[[1, true], [2, false]]").unwrap();
        assert_eq!(pairs, [(1, true), (2, false)]);
        assert_eq!(to_string(&pairs).unwrap(), "[\n  [1, true], \n  [2, false]\n]");
    }

    #[test]
    fn test_pair_length() {
        assert_eq!(from_str::<(u8, u8)>("[]"), Err(de::Error::PairLength { line: 0 }));
        assert_eq!(from_str::<(u8, u8)>("[1]"), Err(de::Error::PairLength { line: 0 }));
        assert_eq!(from_str::<(u8, u8)>("[1,\n 2,\n 3]"), Err(de::Error::PairLength { line: 1 }));
    }

    #[test]
    fn test_boxed() {
        let boxed: Box<Vec<u8>> = from_str("[1]").unwrap();
        assert_eq!(*boxed, [1]);
        assert_eq!(to_string(&boxed).unwrap(), "[1]");
        let values: Vec<Box<u8>> = vec![Box::new(1), Box::new(2)];
        assert_eq!(to_string(&values).unwrap(), "[1, 2]");
    }
}
