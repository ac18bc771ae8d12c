//! JSON reader for `ser-stream`
use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use alloc::{string::String, vec::Vec};

use crate::handler::JsonLoad;
use crate::{SerRead, SliceReader};

/// Deserialize an instance of type `T` from a [`SerRead`] implementation.
///
/// Anything but whitespace following the value is an error.
pub fn from_reader<R, T>(input: R) -> Result<T, R::Error>
    where R: SerRead,
          T: JsonLoad + Default
{
    let mut reader = Reader::new(input);
    let value = reader.read_value()?;
    reader.end()?;
    Ok(value)
}

/// Deserialize an instance of type `T` from a slice of bytes of JSON text.
pub fn from_slice<T>(v: &[u8]) -> Result<T, Infallible>
    where T: JsonLoad + Default
{
    from_reader(SliceReader::new(v))
}

/// Deserialize an instance of type `T` from a string of JSON text.
pub fn from_str<T>(s: &str) -> Result<T, Infallible>
    where T: JsonLoad + Default
{
    from_slice(s.as_bytes())
}

/// JSON reader.
///
/// Pulls tokens from a [`SerRead`] implementation on demand, there is no
/// intermediate document tree. The reader keeps an approximate line number
/// for diagnostics: the larger of the number of `'\r'` and `'\n'` characters
/// seen between tokens so far.
pub struct Reader<R> {
    input: R,
    line_count_r: usize,
    line_count_n: usize,
    first: bool,
}

/// Deserialization result
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Deserialization error
#[derive(Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error<E> {
    /// Underlying reader error
    Reader(E),
    /// A delimiter or a token was expected but something else was found
    Unexpected {
        /// what the reader was looking for
        expected: &'static str,
        /// the offending byte, `None` at the end of input
        found: Option<u8>,
        line: usize
    },
    /// End of input or a raw line break before the closing `'"'`
    UnterminatedString { line: usize },
    /// The token can not be parsed as the expected number type
    InvalidNumber { line: usize },
    /// A string is not valid UTF-8
    InvalidUtf8 { line: usize },
    /// A pair must be read from an array of exactly two elements
    PairLength { line: usize },
    /// JSON has non-whitespace trailing characters after the value
    TrailingCharacters { line: usize },
    /// A record got a key it did not declare
    UnknownField {
        key: String,
        /// all the keys declared by the record
        candidates: Vec<String>,
        line: usize
    },
    /// A record did not get one of its declared keys
    MissingField { key: String },
    /// A record declared the same key twice
    DuplicateField { key: String },
}

impl<E> Error<E> {
    /// The approximate line where a parse error was detected
    pub fn line(&self) -> Option<usize> {
        match *self {
            Error::Unexpected { line, .. } |
            Error::UnterminatedString { line } |
            Error::InvalidNumber { line } |
            Error::InvalidUtf8 { line } |
            Error::PairLength { line } |
            Error::TrailingCharacters { line } |
            Error::UnknownField { line, .. } => Some(line),
            _ => None
        }
    }
}

impl<E: fmt::Display+fmt::Debug> serde::de::StdError for Error<E> {}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Reader(err) => err.fmt(f),
            Error::Unexpected { expected, found, line } => write!(f,
                "Error at line {}: expected {} but got {}", line, expected, Found(*found)),
            Error::UnterminatedString { line } => write!(f,
                "Error at line {}: expected `'\"'` but reached the end of line", line),
            Error::InvalidNumber { line } => write!(f,
                "Error at line {}: expected a number", line),
            Error::InvalidUtf8 { line } => write!(f,
                "Error at line {}: invalid UTF-8 in a JSON string", line),
            Error::PairLength { line } => write!(f,
                "Error at line {}: expected an array of length 2", line),
            Error::TrailingCharacters { line } => write!(f,
                "Error at line {}: JSON has non-whitespace trailing characters after the value", line),
            Error::UnknownField { key, candidates, line } => {
                write!(f, "Error at line {}: unknown field \"{}\", candidates are:", line, key)?;
                for candidate in candidates {
                    write!(f, " \"{}\"", candidate)?;
                }
                Ok(())
            }
            Error::MissingField { key } => write!(f, "missing field \"{}\"", key),
            Error::DuplicateField { key } => write!(f, "adding duplicate field \"{}\"", key),
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Error::Reader(err)
    }
}

struct Found(Option<u8>);

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("end of input"),
            Some(ch) if ch.is_ascii_graphic() || ch == b' ' => write!(f, "'{}'", ch as char),
            Some(ch) => write!(f, "0x{:02X}", ch),
        }
    }
}

/* special JSON characters */
const QU: u8 = b'"';
const RS: u8 = b'\\';
const T_: u8 = 0x09;
const N_: u8 = 0x0A;
const R_: u8 = 0x0D;

/// The same set of characters as C `isspace`
#[inline(always)]
fn is_space(ch: u8) -> bool {
    matches!(ch, b' '|T_|N_|0x0B|0x0C|R_)
}

/// Helper trait for parsing integers
pub trait NumParseTool: Sized + Copy {
    const ZERO: Self;
    fn try_from_ascii_decimal(code: u8) -> Option<Self>;
    fn checked_mul_ten(self) -> Option<Self>;
    fn checked_add_digit(self, rhs: Self) -> Option<Self>;
}

/// Helper trait for parsing negative integers
pub trait CheckedSub: Sized + Copy {
    fn checked_sub_digit(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_parse_tool {
    ($($ty:ty),*) => {$(
        impl NumParseTool for $ty {
            const ZERO: Self = 0;
            #[inline(always)]
            fn try_from_ascii_decimal(code: u8) -> Option<Self> {
                if matches!(code, b'0'..=b'9') {
                    Some((code - b'0') as Self)
                }
                else {
                    None
                }
            }
            #[inline(always)]
            fn checked_mul_ten(self) -> Option<Self> {
                self.checked_mul(10)
            }
            #[inline(always)]
            fn checked_add_digit(self, rhs: Self) -> Option<Self> {
                self.checked_add(rhs)
            }
        }
    )*};
}

macro_rules! impl_checked_sub {
    ($($ty:ty),*) => {$(
        impl CheckedSub for $ty {
            #[inline(always)]
            fn checked_sub_digit(self, rhs: Self) -> Option<Self> {
                self.checked_sub(rhs)
            }
        }
    )*};
}

impl_parse_tool!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
impl_checked_sub!(i8, i16, i32, i64, isize);

/// Textual number parsing used by [`Reader::read_number`].
pub trait NumberParse: Sized {
    /// Consume whitespace and the next number token.
    fn parse_number<R: SerRead>(reader: &mut Reader<R>) -> Result<Self, R::Error>;
}

macro_rules! impl_parse_unsigned {
    ($($ty:ty),*) => {$(
        impl NumberParse for $ty {
            #[inline]
            fn parse_number<R: SerRead>(reader: &mut Reader<R>) -> Result<Self, R::Error> {
                reader.parse_unsigned()
            }
        }
    )*};
}

macro_rules! impl_parse_signed {
    ($($ty:ty),*) => {$(
        impl NumberParse for $ty {
            #[inline]
            fn parse_number<R: SerRead>(reader: &mut Reader<R>) -> Result<Self, R::Error> {
                reader.parse_signed()
            }
        }
    )*};
}

macro_rules! impl_parse_float {
    ($($ty:ident),*) => {$(
        /// `null` is read as `NaN`.
        impl NumberParse for $ty {
            #[inline]
            fn parse_number<R: SerRead>(reader: &mut Reader<R>) -> Result<Self, R::Error> {
                reader.parse_float().map(|v| v.unwrap_or($ty::NAN))
            }
        }
    )*};
}

impl_parse_unsigned!(u8, u16, u32, u64, usize);
impl_parse_signed!(i8, i16, i32, i64, isize);
impl_parse_float!(f32, f64);

impl NumberParse for bool {
    fn parse_number<R: SerRead>(reader: &mut Reader<R>) -> Result<Self, R::Error> {
        match reader.peek_next_non_space()? {
            Some(b't') => reader.parse_token(b"true").map(|_| true),
            Some(b'f') => reader.parse_token(b"false").map(|_| false),
            found => Err(reader.unexpected("`true` or `false`", found))
        }
    }
}

impl<R> Reader<R> {
    /// Create a new `Reader` pulling bytes from `input`.
    pub fn new(input: R) -> Self {
        Reader { input, line_count_r: 0, line_count_n: 0, first: false }
    }
    /// Destruct self returning the `input` object.
    pub fn into_inner(self) -> R {
        self.input
    }
    /// The approximate line of the cursor, counted from 0.
    pub fn line(&self) -> usize {
        self.line_count_r.max(self.line_count_n)
    }

    fn unexpected<E>(&self, expected: &'static str, found: Option<u8>) -> Error<E> {
        Error::Unexpected { expected, found, line: self.line() }
    }

    fn invalid_number<E>(&self) -> Error<E> {
        Error::InvalidNumber { line: self.line() }
    }

    #[inline(always)]
    fn count_line(&mut self, ch: u8) {
        match ch {
            N_ => self.line_count_n += 1,
            R_ => self.line_count_r += 1,
            _ => {}
        }
    }
}

impl<R: SerRead> Reader<R> {
    /// Consume whitespace and return the next non-whitespace byte.
    fn next_non_space(&mut self) -> Result<Option<u8>, R::Error> {
        loop {
            match self.input.read_byte()? {
                Some(ch) => {
                    self.count_line(ch);
                    if !is_space(ch) {
                        return Ok(Some(ch))
                    }
                }
                None => return Ok(None)
            }
        }
    }

    /// Consume whitespace and peek at the next non-whitespace byte.
    fn peek_next_non_space(&mut self) -> Result<Option<u8>, R::Error> {
        loop {
            match self.input.peek_byte()? {
                Some(ch) => {
                    self.count_line(ch);
                    if !is_space(ch) {
                        return Ok(Some(ch))
                    }
                    self.input.read_byte()?;
                }
                None => return Ok(None)
            }
        }
    }

    /// Consume the exact `token`, e.g. `b"null"`.
    fn parse_token(&mut self, token: &'static [u8]) -> Result<(), R::Error> {
        for &expected in token {
            match self.input.read_byte()? {
                Some(ch) if ch == expected => {}
                found => return Err(self.unexpected(
                    core::str::from_utf8(token).unwrap_or("a token"), found))
            }
        }
        Ok(())
    }

    fn parse_digits<T, F>(&mut self, mut number: T, step: F) -> Result<T, R::Error>
        where T: NumParseTool,
              F: Fn(T, T) -> Option<T>
    {
        while let Some(digit) = self.input.peek_byte()?.and_then(T::try_from_ascii_decimal) {
            self.input.read_byte()?;
            number = number.checked_mul_ten()
                .and_then(|n| step(n, digit))
                .ok_or_else(|| self.invalid_number())?;
        }
        Ok(number)
    }

    /// Consume whitespace and then parse a number as an unsigned integer
    pub fn parse_unsigned<T: NumParseTool>(&mut self) -> Result<T, R::Error> {
        match self.peek_next_non_space()?.and_then(T::try_from_ascii_decimal) {
            Some(number) => {
                self.input.read_byte()?;
                self.parse_digits(number, T::checked_add_digit)
            }
            None => Err(self.invalid_number())
        }
    }

    /// Consume whitespace and then parse a number as a signed integer
    pub fn parse_signed<T>(&mut self) -> Result<T, R::Error>
        where T: NumParseTool + CheckedSub
    {
        let is_neg = if self.peek_next_non_space()? == Some(b'-') {
            self.input.read_byte()?;
            true
        }
        else {
            false
        };
        let number = self.input.peek_byte()?
            .and_then(T::try_from_ascii_decimal)
            .ok_or_else(|| self.invalid_number())?;
        self.input.read_byte()?;
        if is_neg {
            let number = T::ZERO.checked_sub_digit(number).ok_or_else(|| self.invalid_number())?;
            self.parse_digits(number, T::checked_sub_digit)
        }
        else {
            self.parse_digits(number, T::checked_add_digit)
        }
    }

    /// Consume whitespace and then parse a number as a float.
    ///
    /// Returns `None` if `null` was found instead.
    pub fn parse_float<F: FromStr>(&mut self) -> Result<Option<F>, R::Error> {
        if self.peek_next_non_space()? == Some(b'n') {
            self.parse_token(b"null")?;
            return Ok(None)
        }
        let mut token = String::new();
        while let Some(ch) = self.input.peek_byte()? {
            if !matches!(ch, b'0'..=b'9'|b'+'|b'-'|b'.'|b'e'|b'E') {
                break
            }
            token.push(ch as char);
            self.input.read_byte()?;
        }
        F::from_str(&token).map(Some).map_err(|_| self.invalid_number())
    }

    /// Parse the next JSON string into `out`.
    ///
    /// A `'\\'` escapes the following character. `\n`, `\r` and `\t` are
    /// decoded into their control characters, any other escaped character
    /// is taken verbatim.
    pub fn read_string(&mut self, out: &mut String) -> Result<(), R::Error> {
        match self.next_non_space()? {
            Some(QU) => {}
            found => return Err(self.unexpected("`'\"'`", found))
        }
        let mut bytes = core::mem::take(out).into_bytes();
        bytes.clear();
        loop {
            let ch = match self.input.read_byte()? {
                Some(QU) => break,
                Some(RS) => match self.input.read_byte()? {
                    Some(b'n') => N_,
                    Some(b'r') => R_,
                    Some(b't') => T_,
                    Some(ch) => ch,
                    None => return Err(Error::UnterminatedString { line: self.line() })
                }
                Some(N_|R_) | None => return Err(Error::UnterminatedString { line: self.line() }),
                Some(ch) => ch
            };
            bytes.push(ch);
        }
        *out = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { line: self.line() })?;
        Ok(())
    }

    /// Parse the next number (or boolean) into `out`.
    pub fn read_number<N: NumberParse>(&mut self, out: &mut N) -> Result<(), R::Error> {
        *out = N::parse_number(self)?;
        Ok(())
    }

    /// Begin parsing an object.
    ///
    /// ```
    /// use ser_stream_json::{Reader, SliceReader};
    /// let mut reader = Reader::new(SliceReader::new(br#"{"a": 1, "b": 2}"#));
    /// let mut key = String::new();
    /// let mut sum = 0u32;
    /// reader.begin_object().unwrap();
    /// while reader.next_object_item(&mut key).unwrap() {
    ///     let mut value = 0u32;
    ///     reader.read(&mut value).unwrap();
    ///     sum += value;
    /// }
    /// assert_eq!(sum, 3);
    /// ```
    pub fn begin_object(&mut self) -> Result<(), R::Error> {
        match self.next_non_space()? {
            Some(b'{') => {
                self.first = true;
                Ok(())
            }
            found => Err(self.unexpected("`'{'`", found))
        }
    }

    /// Begin parsing an array.
    pub fn begin_array(&mut self) -> Result<(), R::Error> {
        match self.next_non_space()? {
            Some(b'[') => {
                self.first = true;
                Ok(())
            }
            found => Err(self.unexpected("`'['`", found))
        }
    }

    /// Try to move to the next object member.
    ///
    /// On `true` the member's key is in `out_key` and exactly one value must
    /// be read before calling this again. `false` means the object is closed.
    pub fn next_object_item(&mut self, out_key: &mut String) -> Result<bool, R::Error> {
        if self.first {
            self.first = false;
            if self.peek_next_non_space()? == Some(b'}') {
                self.input.read_byte()?;
                return Ok(false)
            }
        }
        else {
            match self.next_non_space()? {
                Some(b'}') => return Ok(false),
                Some(b',') => {}
                found => return Err(self.unexpected("`','` or `'}'`", found))
            }
        }
        self.read_string(out_key)?;
        match self.next_non_space()? {
            Some(b':') => Ok(true),
            found => Err(self.unexpected("`':'`", found))
        }
    }

    /// Try to move to the next array element.
    ///
    /// On `true` exactly one value must be read before calling this again.
    /// `false` means the array is closed.
    pub fn next_array_item(&mut self) -> Result<bool, R::Error> {
        if self.first {
            self.first = false;
            if self.peek_next_non_space()? == Some(b']') {
                self.input.read_byte()?;
                return Ok(false)
            }
        }
        else {
            match self.next_non_space()? {
                Some(b']') => return Ok(false),
                Some(b',') => {}
                found => return Err(self.unexpected("`','` or `']'`", found))
            }
        }
        Ok(true)
    }

    /// Read the next value into `out` according to its [`JsonLoad`] implementation.
    pub fn read<T: JsonLoad + ?Sized>(&mut self, out: &mut T) -> Result<(), R::Error> {
        out.load(self)
    }

    /// Read the next value into a new instance of `T`.
    pub fn read_value<T: JsonLoad + Default>(&mut self) -> Result<T, R::Error> {
        let mut value = T::default();
        self.read(&mut value)?;
        Ok(value)
    }

    /// Check that nothing but whitespace is left in the input.
    pub fn end(&mut self) -> Result<(), R::Error> {
        match self.peek_next_non_space()? {
            None => Ok(()),
            Some(_) => Err(Error::TrailingCharacters { line: self.line() })
        }
    }
}
