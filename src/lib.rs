//! Byte stream traits for reader/writer-style serializers.
//!
//! [`SerWrite`] is an append-only sink, [`SerRead`] is a byte source with a
//! single byte of lookahead. Both are small enough to be implemented for
//! fixed buffers on `no_std` targets.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc",not(feature = "std")))]
extern crate alloc;

use core::convert::Infallible;
use core::fmt;

mod foreign;

#[cfg(feature = "std")]
pub use foreign::{IoReader, IoWriter};

pub type SerResult<T> = Result<T, SerError>;

/// An error returned by [`SerWrite`] implementations with a fixed capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SerError {
    /// Buffer is full
    BufferFull,
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::BufferFull => f.write_str("buffer is full"),
        }
    }
}

/// Serializers should write data to the implementations of this trait.
pub trait SerWrite {
    /// The error produced by the underlying sink.
    type Error;
    /// Write all bytes from `buf` to the internal buffer.
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
    /// Write a single `byte` to the internal buffer.
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write(core::slice::from_ref(&byte))
    }
    /// Write a string to the internal buffer.
    #[inline]
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write(s.as_bytes())
    }
}

impl<T: SerWrite + ?Sized> SerWrite for &'_ mut T {
    type Error = T::Error;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).write(buf)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }
}

/// Deserializers pull data from the implementations of this trait.
///
/// The end of the stream is reported as `Ok(None)`, errors are reserved for
/// failures of the underlying source.
pub trait SerRead {
    /// The error produced by the underlying source.
    type Error;
    /// Return the next byte without consuming it.
    fn peek_byte(&mut self) -> Result<Option<u8>, Self::Error>;
    /// Consume and return the next byte.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

impl<T: SerRead + ?Sized> SerRead for &'_ mut T {
    type Error = T::Error;

    #[inline]
    fn peek_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        (**self).peek_byte()
    }
    #[inline]
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        (**self).read_byte()
    }
}

/// A simple slice writer
#[derive(Debug, PartialEq)]
pub struct SliceWriter<'a> {
    pub buf: &'a mut [u8],
    pub len: usize
}

impl<'a> AsRef<[u8]> for SliceWriter<'a> {
    /// Returns a populated portion of the slice
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<'a> SliceWriter<'a> {
    /// Create new instance
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, len: 0 }
    }
    /// Return populated length
    pub fn len(&self) -> usize {
        self.len
    }
    /// Return `true` if nothing was written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Return remaining capacity
    pub fn rem_capacity(&self) -> usize {
        self.buf.len() - self.len
    }
    /// Forget the written content
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl SerWrite for SliceWriter<'_> {
    type Error = SerError;

    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        let end = self.len + buf.len();
        match self.buf.get_mut(self.len..end) {
            Some(chunk) => {
                chunk.copy_from_slice(buf);
                self.len = end;
                Ok(())
            }
            None => Err(SerError::BufferFull)
        }
    }
}

/// A reader over a borrowed slice of bytes
#[derive(Debug, Clone, PartialEq)]
pub struct SliceReader<'a> {
    input: &'a [u8],
    index: usize
}

impl<'a> SliceReader<'a> {
    /// Create new instance
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader { input, index: 0 }
    }
    /// Return the number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.index
    }
    /// Return the unread portion of the input
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.index..]
    }
}

impl SerRead for SliceReader<'_> {
    type Error = Infallible;

    #[inline]
    fn peek_byte(&mut self) -> Result<Option<u8>, Infallible> {
        Ok(self.input.get(self.index).copied())
    }

    #[inline]
    fn read_byte(&mut self) -> Result<Option<u8>, Infallible> {
        let byte = self.input.get(self.index).copied();
        if byte.is_some() {
            self.index += 1;
        }
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_writer() {
        let mut buf = [0u8;22];
        let mut writer = SliceWriter::new(&mut buf[..]);
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_str("Good Bye!").unwrap();
        assert_eq!(writer.as_ref(), b"Hello World! Good Bye!");
        assert_eq!(writer.rem_capacity(), 0);
        assert_eq!(writer.write_byte(b' ').unwrap_err(), SerError::BufferFull);
        writer.clear();
        assert!(writer.is_empty());
        writer.write_str("again").unwrap();
        assert_eq!(writer.as_ref(), b"again");
    }

    #[test]
    fn test_slice_reader() {
        let mut reader = SliceReader::new(b"ab");
        assert_eq!(reader.peek_byte(), Ok(Some(b'a')));
        assert_eq!(reader.peek_byte(), Ok(Some(b'a')));
        assert_eq!(reader.read_byte(), Ok(Some(b'a')));
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.remaining(), b"b");
        assert_eq!(reader.read_byte(), Ok(Some(b'b')));
        assert_eq!(reader.peek_byte(), Ok(None));
        assert_eq!(reader.read_byte(), Ok(None));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_mut_ref_forwarding() {
        let mut reader = SliceReader::new(b"x");
        {
            let mut by_ref = &mut reader;
            assert_eq!(by_ref.read_byte(), Ok(Some(b'x')));
        }
        assert_eq!(reader.read_byte(), Ok(None));
    }
}
