/// Implementation for foreign types
#[cfg(feature = "std")]
use std::{vec::Vec, collections::VecDeque, io::{self, Cursor, BufRead}};
#[cfg(all(feature = "alloc",not(feature = "std")))]
use alloc::{vec::Vec, collections::VecDeque};

#[allow(unused_imports)]
use super::*;

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl SerWrite for Vec<u8> {
    type Error = SerError;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> SerResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl SerWrite for VecDeque<u8> {
    type Error = SerError;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        self.extend(buf.iter().copied());
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> SerResult<()> {
        self.push_back(byte);
        Ok(())
    }
}

/// A queue is drained from the front, so the same `VecDeque` can be used
/// as a pipe between a writer and a reader.
#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl SerRead for VecDeque<u8> {
    type Error = Infallible;

    #[inline]
    fn peek_byte(&mut self) -> Result<Option<u8>, Infallible> {
        Ok(self.front().copied())
    }
    #[inline]
    fn read_byte(&mut self) -> Result<Option<u8>, Infallible> {
        Ok(self.pop_front())
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<T> SerWrite for Cursor<T>
    where Cursor<T>: std::io::Write
{
    type Error = SerError;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        std::io::Write::write_all(self, buf).map_err(|_| SerError::BufferFull)
    }
}

/// Adapts any [`std::io::Write`] to [`SerWrite`], passing I/O errors through.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoWriter<W>(pub W);

#[cfg(feature = "std")]
impl<W: io::Write> SerWrite for IoWriter<W> {
    type Error = io::Error;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }
}

/// Adapts any [`std::io::BufRead`] to [`SerRead`].
///
/// Peeking relies on the internal buffer of the source, so wrap unbuffered
/// readers in a [`std::io::BufReader`] first.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoReader<R>(pub R);

#[cfg(feature = "std")]
impl<R: BufRead> SerRead for IoReader<R> {
    type Error = io::Error;

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.0.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e)
            }
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.0.consume(1);
        }
        Ok(byte)
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> SerWrite for arrayvec::ArrayVec<u8, CAP> {
    type Error = SerError;

    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        self.try_extend_from_slice(buf).map_err(|_| SerError::BufferFull)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> SerResult<()> {
        self.try_push(byte).map_err(|_| SerError::BufferFull)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> SerWrite for heapless::Vec<u8, CAP> {
    type Error = SerError;

    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        self.extend_from_slice(buf).map_err(|_| SerError::BufferFull)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> SerResult<()> {
        self.push(byte).map_err(|_| SerError::BufferFull)
    }
}

#[cfg(feature = "smallvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "smallvec")))]
impl<A: smallvec::Array<Item = u8>> SerWrite for smallvec::SmallVec<A> {
    type Error = SerError;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> SerResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(feature = "tinyvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "tinyvec")))]
impl<A: tinyvec::Array<Item = u8>> SerWrite for tinyvec::ArrayVec<A> {
    type Error = SerError;

    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        if self.capacity() - self.len() < buf.len() {
            return Err(SerError::BufferFull)
        }
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> SerResult<()> {
        match self.try_push(byte) {
            None => Ok(()),
            Some(_) => Err(SerError::BufferFull)
        }
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[test]
    fn test_ser_write_vec() {
        let mut writer = Vec::new();
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_str("Good Bye!").unwrap();
        assert_eq!(&writer, b"Hello World! Good Bye!");
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[test]
    fn test_vec_deque_pipe() {
        let mut pipe = VecDeque::new();
        pipe.write(b"{}").unwrap();
        pipe.write_byte(b' ').unwrap();
        assert_eq!(pipe.peek_byte(), Ok(Some(b'{')));
        assert_eq!(pipe.read_byte(), Ok(Some(b'{')));
        assert_eq!(pipe.read_byte(), Ok(Some(b'}')));
        assert_eq!(pipe.read_byte(), Ok(Some(b' ')));
        assert_eq!(pipe.read_byte(), Ok(None));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_ser_write_cursor() {
        let mut writer = Cursor::new([0u8;22]);
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_str("Good Bye!").unwrap();
        assert_eq!(writer.get_ref(), b"Hello World! Good Bye!");
        assert_eq!(writer.write_byte(b' ').unwrap_err(), SerError::BufferFull);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_io_adapters() {
        let mut writer = IoWriter(Vec::new());
        writer.write_str("[1]").unwrap();
        let IoWriter(bytes) = writer;
        let mut reader = IoReader(std::io::BufReader::with_capacity(2, &bytes[..]));
        assert_eq!(reader.peek_byte().unwrap(), Some(b'['));
        assert_eq!(reader.read_byte().unwrap(), Some(b'['));
        assert_eq!(reader.read_byte().unwrap(), Some(b'1'));
        assert_eq!(reader.peek_byte().unwrap(), Some(b']'));
        assert_eq!(reader.read_byte().unwrap(), Some(b']'));
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[cfg(feature = "arrayvec")]
    #[test]
    fn test_ser_write_arrayvec() {
        let mut writer = arrayvec::ArrayVec::<u8,22>::new();
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_str("Good Bye!").unwrap();
        assert_eq!(writer.as_slice(), b"Hello World! Good Bye!");
        assert_eq!(writer.write_byte(b' ').unwrap_err(), SerError::BufferFull);
    }

    #[cfg(feature = "heapless")]
    #[test]
    fn test_ser_write_heapless() {
        let mut writer = heapless::Vec::<u8,22>::new();
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_str("Good Bye!").unwrap();
        assert_eq!(writer.as_slice(), b"Hello World! Good Bye!");
        assert_eq!(writer.write_byte(b' ').unwrap_err(), SerError::BufferFull);
    }

    #[cfg(feature = "smallvec")]
    #[test]
    fn test_ser_write_smallvec() {
        let mut writer = smallvec::SmallVec::<[u8;4]>::new();
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b'.').unwrap();
        assert_eq!(writer.as_slice(), b"Hello World!.");
    }

    #[cfg(feature = "tinyvec")]
    #[test]
    fn test_ser_write_tinyvec() {
        let mut writer = tinyvec::ArrayVec::<[u8;12]>::new();
        writer.write(b"Hello World!").unwrap();
        assert_eq!(writer.as_slice(), b"Hello World!");
        assert_eq!(writer.write_byte(b' ').unwrap_err(), SerError::BufferFull);
        assert_eq!(writer.write(b"!").unwrap_err(), SerError::BufferFull);
    }
}
