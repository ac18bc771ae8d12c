//! JSON writer for `ser-stream`
use core::fmt;

use alloc::{vec::Vec, string::String};

use crate::handler::JsonSave;
use crate::{SerWrite, SerError};

/// JSON writer.
///
/// Emits the grammar understood by [`Reader`](crate::de::Reader) to a
/// [`SerWrite`] implementation. Every open array or object is tracked on a
/// scope stack, together with a flag telling whether that scope is rendered
/// with newlines and indentation or on a single line.
pub struct Writer<W> {
    first: bool,
    scope: Vec<bool>,
    layout: Layout,
    output: W,
}

/// Serialization error
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error<E> {
    /// Underlying writer error
    Writer(E),
    /// `end_array` or `end_object` was called without an open scope
    NoOpenScope,
    /// The number of open scopes changed while writing a single value
    UnbalancedScope {
        /// scope depth before the value was written
        expected: usize,
        /// scope depth after the value was written
        found: usize
    },
    /// The written bytes are not a valid UTF-8 string
    Utf8Encode,
}

/// Serialization result
pub type Result<T, E> = core::result::Result<T, Error<E>>;

impl<E: fmt::Display+fmt::Debug> serde::de::StdError for Error<E> {}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Writer(err) => err.fmt(f),
            Error::NoOpenScope => f.write_str("no open JSON array or object to end"),
            Error::UnbalancedScope { expected, found } => write!(f,
                "uneven JSON scope: depth {} before and {} after writing a value, \
                 is every begin_array/begin_object matched by its end?", expected, found),
            Error::Utf8Encode => f.write_str("error encoding JSON as UTF-8 string"),
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Error::Writer(err)
    }
}

/// Line-breaking policy of a [`Writer`].
///
/// Affects only whitespace, any layout is read back by the same reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Spaces per nesting level in multi-line scopes
    pub indent: usize,
    /// Sequences of scalars with at most this many elements stay on one line
    pub seq_inline_max: usize,
    /// Maps with at most this many entries stay on one line
    pub map_inline_max: usize,
    /// When `false` every scope is written on a single line
    pub pretty: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::new()
    }
}

impl Layout {
    /// The default human-readable layout
    pub const fn new() -> Self {
        Layout { indent: 2, seq_inline_max: 10, map_inline_max: 1, pretty: true }
    }
    /// A layout that never breaks lines
    pub const fn compact() -> Self {
        Layout { pretty: false, ..Layout::new() }
    }
    /// Whether a sequence of `len` elements should span multiple lines.
    ///
    /// `scalar` tells if the element type is a plain number.
    pub fn sequence_multi_line(&self, len: usize, scalar: bool) -> bool {
        len > self.seq_inline_max || !scalar
    }
    /// Whether a map of `len` entries should span multiple lines.
    pub fn map_multi_line(&self, len: usize) -> bool {
        len > self.map_inline_max
    }
}

/// Serialize `value` as JSON to a [`SerWrite`] implementation using a provided [`Layout`].
pub fn to_writer_with_layout<W, T>(writer: W, layout: Layout, value: &T) -> Result<(), W::Error>
    where W: SerWrite,
          T: JsonSave + ?Sized
{
    Writer::with_layout(writer, layout).write(value)
}

/// Serialize `value` as JSON to a [`SerWrite`] implementation.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<(), W::Error>
    where W: SerWrite,
          T: JsonSave + ?Sized
{
    to_writer_with_layout(writer, Layout::new(), value)
}

/// Serialize `value` as a JSON string.
pub fn to_string<T>(value: &T) -> Result<String, SerError>
    where T: JsonSave + ?Sized
{
    let mut vec: Vec<u8> = Vec::new();
    to_writer(&mut vec, value)?;
    String::from_utf8(vec).map_err(|_| Error::Utf8Encode)
}

/// Serialize `value` as a single-line JSON string.
pub fn to_string_compact<T>(value: &T) -> Result<String, SerError>
    where T: JsonSave + ?Sized
{
    let mut vec: Vec<u8> = Vec::new();
    to_writer_with_layout(&mut vec, Layout::compact(), value)?;
    String::from_utf8(vec).map_err(|_| Error::Utf8Encode)
}

impl<W> Writer<W> {
    /// Create a new `Writer` with the given `output` that should implement [`SerWrite`].
    #[inline(always)]
    pub fn new(output: W) -> Self {
        Writer::with_layout(output, Layout::new())
    }
    /// Create a new `Writer` with a custom [`Layout`].
    #[inline(always)]
    pub fn with_layout(output: W, layout: Layout) -> Self {
        Writer { first: false, scope: Vec::new(), layout, output }
    }
    /// Destruct self returning the `output` object.
    #[inline(always)]
    pub fn into_inner(self) -> W {
        self.output
    }
    /// Provide access to the inner writer.
    #[inline(always)]
    pub fn writer(&mut self) -> &mut W {
        &mut self.output
    }
    /// The layout used by container handlers.
    #[inline(always)]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
    /// The number of currently open arrays and objects.
    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.scope.len()
    }
}

impl<W: SerWrite> Writer<W> {
    /// Write a string, escaping `\r`, `\n`, `\t`, `\\` and `"`.
    pub fn write_string(&mut self, s: &str) -> Result<(), W::Error> {
        self.output.write_byte(b'"')?;
        format_escaped_str_contents(&mut self.output, s)?;
        Ok(self.output.write_byte(b'"')?)
    }

    /// Write a string as is.
    ///
    /// The caller must make sure `s` contains nothing that needs escaping.
    pub fn write_no_escape(&mut self, s: &str) -> Result<(), W::Error> {
        self.output.write_byte(b'"')?;
        self.output.write_str(s)?;
        Ok(self.output.write_byte(b'"')?)
    }

    /// Write a number (or a boolean).
    pub fn write_number<N: NumberFormat>(&mut self, v: N) -> Result<(), W::Error> {
        Ok(v.format_number(&mut self.output)?)
    }

    /// Open an array.
    pub fn begin_array(&mut self, multi_line: bool) -> Result<(), W::Error> {
        self.output.write_byte(b'[')?;
        self.scope.push(multi_line && self.layout.pretty);
        self.first = true;
        Ok(())
    }

    /// Close the innermost array.
    pub fn end_array(&mut self) -> Result<(), W::Error> {
        self.end_scope(b']')
    }

    /// Open an object.
    pub fn begin_object(&mut self, multi_line: bool) -> Result<(), W::Error> {
        self.output.write(b"{ ")?;
        self.scope.push(multi_line && self.layout.pretty);
        self.first = true;
        Ok(())
    }

    /// Close the innermost object.
    pub fn end_object(&mut self) -> Result<(), W::Error> {
        self.end_scope(b'}')
    }

    /// Write a `"key": value` member of the innermost object.
    pub fn write_object_key_value<T>(&mut self, key: &str, value: &T) -> Result<(), W::Error>
        where T: JsonSave + ?Sized
    {
        self.write_comma()?;
        self.write_separator()?;
        self.write_string(key)?;
        self.output.write(b": ")?;
        value.save(self)
    }

    /// Write an element of the innermost array.
    pub fn write_array_item<T>(&mut self, value: &T) -> Result<(), W::Error>
        where T: JsonSave + ?Sized
    {
        self.write_comma()?;
        self.write_separator()?;
        value.save(self)
    }

    /// Write any value that implements [`JsonSave`].
    ///
    /// Fails with [`Error::UnbalancedScope`] if the value left a different
    /// number of open scopes than it found.
    pub fn write<T>(&mut self, value: &T) -> Result<(), W::Error>
        where T: JsonSave + ?Sized
    {
        let expected = self.scope.len();
        value.save(self)?;
        let found = self.scope.len();
        if expected != found {
            log::debug!("uneven JSON scope after write: {} -> {}", expected, found);
            return Err(Error::UnbalancedScope { expected, found })
        }
        Ok(())
    }

    fn end_scope(&mut self, close: u8) -> Result<(), W::Error> {
        let newline = self.scope.pop().ok_or(Error::NoOpenScope)?;
        if newline {
            self.write_newline()?;
        }
        self.first = false;
        Ok(self.output.write_byte(close)?)
    }

    #[inline]
    fn write_comma(&mut self) -> Result<(), W::Error> {
        if self.first {
            self.first = false;
        }
        else {
            self.output.write(b", ")?;
        }
        Ok(())
    }

    /// Break the line and indent if the innermost scope is multi-line.
    fn write_separator(&mut self) -> Result<(), W::Error> {
        if self.scope.last().copied().unwrap_or(true) {
            self.write_newline()?;
        }
        Ok(())
    }

    fn write_newline(&mut self) -> Result<(), W::Error> {
        self.output.write_byte(b'\n')?;
        let mut pad = self.scope.len() * self.layout.indent;
        while pad != 0 {
            let chunk = pad.min(SPACES.len());
            self.output.write(&SPACES[..chunk])?;
            pad -= chunk;
        }
        Ok(())
    }
}

const SPACES: &[u8;16] = b"                ";

/// Textual number formatting used by [`Writer::write_number`].
pub trait NumberFormat: Copy {
    /// Write `self` to `output` as a JSON token.
    fn format_number<W: SerWrite + ?Sized>(self, output: &mut W) -> core::result::Result<(), W::Error>;
}

fn format_unsigned<W: SerWrite + ?Sized>(output: &mut W, mut v: u64) -> core::result::Result<(), W::Error> {
    // "18446744073709551615"
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = (v % 10) as u8 + b'0';
        v /= 10;
        if v == 0 {
            break
        }
    }
    output.write(&buf[i..])
}

fn format_signed<W: SerWrite + ?Sized>(output: &mut W, v: i64) -> core::result::Result<(), W::Error> {
    // "-9223372036854775808"
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    let mut u = v.unsigned_abs();
    loop {
        i -= 1;
        buf[i] = (u % 10) as u8 + b'0';
        u /= 10;
        if u == 0 {
            break
        }
    }
    if v < 0 {
        i -= 1;
        buf[i] = b'-';
    }
    output.write(&buf[i..])
}

macro_rules! impl_format_unsigned {
    ($($ty:ty),*) => {$(
        impl NumberFormat for $ty {
            #[inline]
            fn format_number<W: SerWrite + ?Sized>(self, output: &mut W) -> core::result::Result<(), W::Error> {
                format_unsigned(output, self as u64)
            }
        }
    )*};
}

macro_rules! impl_format_signed {
    ($($ty:ty),*) => {$(
        impl NumberFormat for $ty {
            #[inline]
            fn format_number<W: SerWrite + ?Sized>(self, output: &mut W) -> core::result::Result<(), W::Error> {
                format_signed(output, self as i64)
            }
        }
    )*};
}

macro_rules! impl_format_ryu {
    ($($ty:ty),*) => {$(
        /// Non-finite values are written as `null`.
        impl NumberFormat for $ty {
            fn format_number<W: SerWrite + ?Sized>(self, output: &mut W) -> core::result::Result<(), W::Error> {
                if self.is_finite() {
                    let mut buffer = ryu_js::Buffer::new();
                    output.write_str(buffer.format_finite(self))
                }
                else {
                    output.write(b"null")
                }
            }
        }
    )*};
}

impl_format_unsigned!(u8, u16, u32, u64, usize);
impl_format_signed!(i8, i16, i32, i64, isize);
impl_format_ryu!(f32, f64);

impl NumberFormat for bool {
    #[inline]
    fn format_number<W: SerWrite + ?Sized>(self, output: &mut W) -> core::result::Result<(), W::Error> {
        output.write_str(if self { "true" } else { "false" })
    }
}

fn format_escaped_str_contents<W>(
    writer: &mut W,
    value: &str,
) -> core::result::Result<(), W::Error>
    where W: ?Sized + SerWrite
{
    let bytes = value.as_bytes();

    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escape = match byte {
            b'\r' => RR,
            b'\n' => NN,
            b'\t' => TT,
            QU|BS => byte,
            _ => continue
        };

        if start < i {
            writer.write_str(&value[start..i])?;
        }

        writer.write(&[b'\\', escape])?;

        start = i + 1;
    }

    if start == bytes.len() {
        return Ok(());
    }

    writer.write_str(&value[start..])
}

const TT: u8 = b't'; // \x09
const NN: u8 = b'n'; // \x0A
const RR: u8 = b'r'; // \x0D
const QU: u8 = b'"'; // \x22
const BS: u8 = b'\\'; // \x5C

#[cfg(test)]
mod tests {
    use alloc::{vec, string::ToString, collections::BTreeMap};
    use super::*;

    fn written<T: JsonSave + ?Sized>(value: &T) -> String {
        to_string(value).unwrap()
    }

    #[test]
    fn test_write_numbers() {
        assert_eq!(written(&0u8), "0");
        assert_eq!(written(&u64::MAX), "18446744073709551615");
        assert_eq!(written(&i64::MIN), "-9223372036854775808");
        assert_eq!(written(&-17i8), "-17");
        assert_eq!(written(&isize::MAX), isize::MAX.to_string());
        assert_eq!(written(&-20.0f32), "-20");
        assert_eq!(written(&0.4f64), "0.4");
        assert_eq!(written(&-2.3456789012345e-23f32), "-2.3456788e-23");
        assert_eq!(written(&f64::NAN), "null");
        assert_eq!(written(&f32::NEG_INFINITY), "null");
        assert_eq!(written(&true), "true");
        assert_eq!(written(&false), "false");
    }

    #[test]
    fn test_write_string() {
        assert_eq!(written("hello"), r#""hello""#);
        assert_eq!(written(""), r#""""#);
        assert_eq!(written("foo\"bar"), r#""foo\"bar""#);
        assert_eq!(written("foo\\bar"), r#""foo\\bar""#);
        assert_eq!(written(" \r\n\t "), r#"" \r\n\t ""#);
        // everything else passes through
        assert_eq!(written("łączka \u{8} \u{1f} 💣"), "\"łączka \u{8} \u{1f} 💣\"");
    }

    #[test]
    fn test_write_no_escape() {
        let mut writer = Writer::new(Vec::<u8>::new());
        writer.write_no_escape("a\\b").unwrap();
        assert_eq!(writer.into_inner(), b"\"a\\b\"");
    }

    #[test]
    fn test_write_short_sequence() {
        assert_eq!(written(&vec![1, 2, 3]), "[1, 2, 3]");
        assert_eq!(written(&Vec::<i32>::new()), "[]");
        assert_eq!(written(&[1.5f64, 2.0]), "[1.5, 2]");
    }

    #[test]
    fn test_write_long_sequence() {
        let v: Vec<u32> = (0..11).collect();
        let expected = "[\n  0, \n  1, \n  2, \n  3, \n  4, \n  5, \n  6, \n  7, \n  8, \n  9, \n  10\n]";
        assert_eq!(written(&v), expected);
        assert_eq!(to_string_compact(&v).unwrap(), "[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]");
    }

    #[test]
    fn test_write_nested() {
        assert_eq!(written(&vec![vec![1, 2], vec![]]), "[\n  [1, 2], \n  []\n]");
        assert_eq!(written(&vec!["a", "b"]), "[\n  \"a\", \n  \"b\"\n]");
    }

    #[test]
    fn test_write_map() {
        let mut map = BTreeMap::new();
        assert_eq!(written(&map), "{ }");
        map.insert("a".to_string(), 1);
        assert_eq!(written(&map), r#"{ "a": 1}"#);
        map.insert("b".to_string(), 2);
        assert_eq!(written(&map), "{ \n  \"a\": 1, \n  \"b\": 2\n}");
        let mut outer = BTreeMap::new();
        outer.insert("x\"y".to_string(), map);
        assert_eq!(written(&outer), "{ \"x\\\"y\": { \n    \"a\": 1, \n    \"b\": 2\n  }}");
    }

    #[test]
    fn test_write_pair() {
        assert_eq!(written(&(1, "x")), r#"[1, "x"]"#);
    }

    #[test]
    fn test_custom_layout() {
        let layout = Layout { indent: 4, seq_inline_max: 2, ..Layout::new() };
        let mut vec: Vec<u8> = Vec::new();
        to_writer_with_layout(&mut vec, layout, &[1, 2, 3]).unwrap();
        assert_eq!(vec, b"[\n    1, \n    2, \n    3\n]");
        vec.clear();
        to_writer_with_layout(&mut vec, layout, &[1, 2]).unwrap();
        assert_eq!(vec, b"[1, 2]");
    }

    #[test]
    fn test_manual_scopes() {
        let mut writer = Writer::new(Vec::<u8>::new());
        writer.begin_object(true).unwrap();
        writer.write_object_key_value("n", &1u8).unwrap();
        writer.write_object_key_value("s", "x").unwrap();
        assert_eq!(writer.depth(), 1);
        writer.end_object().unwrap();
        assert_eq!(writer.depth(), 0);
        assert_eq!(writer.into_inner(), b"{ \n  \"n\": 1, \n  \"s\": \"x\"\n}");
    }

    #[test]
    fn test_unbalanced_scope() {
        struct Unclosed;
        impl JsonSave for Unclosed {
            fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> Result<(), W::Error> {
                writer.begin_array(false)
            }
        }
        struct Overclosed;
        impl JsonSave for Overclosed {
            fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> Result<(), W::Error> {
                writer.end_array()
            }
        }
        assert_eq!(to_string(&Unclosed), Err(Error::UnbalancedScope { expected: 0, found: 1 }));
        assert_eq!(to_string(&Overclosed), Err(Error::NoOpenScope));

        let mut writer = Writer::new(Vec::<u8>::new());
        writer.begin_array(true).unwrap();
        assert_eq!(writer.write(&Overclosed), Err(Error::UnbalancedScope { expected: 1, found: 0 }));
    }

    #[test]
    fn test_slice_writer_full() {
        let mut buf = [0u8; 4];
        let writer = ser_stream::SliceWriter::new(&mut buf);
        assert_eq!(to_writer(writer, &12345u32), Err(Error::Writer(SerError::BufferFull)));
    }

    #[test]
    fn test_error_display() {
        let err: Error<SerError> = Error::UnbalancedScope { expected: 0, found: 2 };
        assert!(err.to_string().starts_with("uneven JSON scope: depth 0 before and 2 after"));
        let err: Error<SerError> = SerError::BufferFull.into();
        assert_eq!(err.to_string(), "buffer is full");
    }
}
