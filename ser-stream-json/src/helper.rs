//! Declarative reading of records.
use alloc::{collections::BTreeMap, string::{String, ToString}, vec::Vec};

use crate::{de, JsonLoad, Reader, SerRead};

/// Reads a JSON object into the fields of a record.
///
/// A fresh helper is built in every [`JsonLoad::load`] of the record: each
/// field is declared under its key and bound to its destination, then
/// [`read_all_fields`](Self::read_all_fields) reads the object.
///
/// The schema is strict. A key that was not declared fails the read, and so
/// does a declared key that never shows up (unless declared with
/// [`declare_optional_field`](Self::declare_optional_field)).
///
/// ```
/// use ser_stream_json::{de, from_str, JsonLoad, ObjectReadHelper, Reader, SerRead};
///
/// #[derive(Default)]
/// struct Point { x: i32, y: i32 }
///
/// impl JsonLoad for Point {
///     fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
///         let mut helper = ObjectReadHelper::new();
///         helper.declare_field("x", &mut self.x)?;
///         helper.declare_field("y", &mut self.y)?;
///         helper.read_all_fields(reader)
///     }
/// }
///
/// let point: Point = from_str(r#"{"y": -1, "x": 7}"#).unwrap();
/// assert_eq!((point.x, point.y), (7, -1));
/// ```
pub struct ObjectReadHelper<'a, R: SerRead> {
    fields: BTreeMap<&'a str, Slot<'a, R>>,
}

struct Slot<'a, R: SerRead> {
    dest: &'a mut dyn FieldLoad<R>,
    optional: bool,
    visited: bool,
}

/// Object safe face of [`JsonLoad`] for a fixed reader type.
trait FieldLoad<R: SerRead> {
    fn load_field(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error>;
}

impl<R: SerRead, T: JsonLoad> FieldLoad<R> for T {
    #[inline]
    fn load_field(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        self.load(reader)
    }
}

impl<R: SerRead> Default for ObjectReadHelper<'_, R> {
    fn default() -> Self {
        ObjectReadHelper { fields: BTreeMap::new() }
    }
}

impl<'a, R: SerRead> ObjectReadHelper<'a, R> {
    /// Create a helper with no fields declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `field`. The key must be present in the object.
    pub fn declare_field<T>(&mut self, key: &'a str, field: &'a mut T) -> de::Result<(), R::Error>
        where T: JsonLoad + 'a
    {
        self.declare(key, field, false)
    }

    /// Bind `key` to `field`. When the key is absent `field` is left untouched.
    pub fn declare_optional_field<T>(&mut self, key: &'a str, field: &'a mut T) -> de::Result<(), R::Error>
        where T: JsonLoad + 'a
    {
        self.declare(key, field, true)
    }

    fn declare(&mut self, key: &'a str, dest: &'a mut dyn FieldLoad<R>, optional: bool) -> de::Result<(), R::Error> {
        if self.fields.contains_key(key) {
            log::debug!("field \"{}\" declared twice", key);
            return Err(de::Error::DuplicateField { key: key.to_string() })
        }
        self.fields.insert(key, Slot { dest, optional, visited: false });
        Ok(())
    }

    /// Read the next JSON object into the declared fields.
    pub fn read_all_fields(mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        log::trace!("reading object with {} declared fields at line {}", self.fields.len(), reader.line());
        let mut key = String::new();
        reader.begin_object()?;
        while reader.next_object_item(&mut key)? {
            match self.fields.get_mut(key.as_str()) {
                Some(slot) => {
                    slot.dest.load_field(reader)?;
                    slot.visited = true;
                }
                None => {
                    let line = reader.line();
                    log::debug!("unknown field \"{}\" at line {}", key, line);
                    let candidates: Vec<String> = self.fields.keys().map(|k| k.to_string()).collect();
                    return Err(de::Error::UnknownField { key, candidates, line })
                }
            }
        }
        if let Some((key, _)) = self.fields.iter().find(|(_, slot)| !slot.visited && !slot.optional) {
            log::debug!("missing field \"{}\" in object ending at line {}", key, reader.line());
            return Err(de::Error::MissingField { key: key.to_string() })
        }
        log::trace!("object read");
        Ok(())
    }
}
