//! A reader over in-memory bytes.

use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result, StreamState};

use crate::reader::Reader;

/// A [`Reader`] over any stable in-memory byte container.
///
/// The whole container is the window, so `pull` never has work to do and
/// random access is always supported. `T` may be a borrowed slice, an owned
/// `Vec<u8>`/`String`, a shared `bytes::Bytes`, or anything else exposing
/// `AsRef<[u8]>` whose contents do not change while the reader is in use.
///
/// The cursor is an index into the container, so moving the reader (or the
/// container it owns) never invalidates the window.
#[derive(Debug)]
pub struct SliceReader<T: AsRef<[u8]>> {
    src: T,
    cursor: usize,
    state: StreamState,
}

impl<T: AsRef<[u8]>> SliceReader<T> {
    /// Create a reader positioned at the start of `src`.
    pub fn new(src: T) -> Self {
        Self {
            src,
            cursor: 0,
            state: StreamState::new(),
        }
    }

    /// The container being read from. Unchanged by `close`.
    pub fn get_ref(&self) -> &T {
        &self.src
    }

    /// Consume the reader and return the container.
    pub fn into_inner(self) -> T {
        self.src
    }

    #[inline]
    fn len(&self) -> usize {
        self.src.as_ref().len()
    }
}

impl<T: AsRef<[u8]>> Reader for SliceReader<T> {
    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn error(&self) -> Option<&OxiStreamError> {
        self.state.error()
    }

    fn fail(&mut self, error: OxiStreamError) -> OxiStreamError {
        self.state.fail(error)
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.is_open() {
            return self.state.close_result();
        }
        self.state.mark_closed();
        self.state.close_result()
    }

    fn chunk(&self) -> &[u8] {
        if self.state.is_open() {
            &self.src.as_ref()[self.cursor..]
        } else {
            &[]
        }
    }

    fn start_to_cursor(&self) -> usize {
        if self.state.is_open() {
            self.cursor
        } else {
            0
        }
    }

    fn limit_pos(&self) -> Position {
        if self.state.is_open() {
            self.len() as Position
        } else {
            self.cursor as Position
        }
    }

    fn advance(&mut self, length: usize) {
        assert!(
            length <= self.available(),
            "advance past the window limit: {} > {}",
            length,
            self.available()
        );
        self.cursor += length;
    }

    fn pull(&mut self, min_length: usize, _recommended_length: usize) -> Result<bool> {
        if self.available() >= min_length {
            return Ok(true);
        }
        self.check_ok()?;
        Ok(false)
    }

    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        self.check_ok()?;
        if new_pos > self.len() as Position {
            self.cursor = self.len();
            return Ok(false);
        }
        self.cursor = new_pos as usize;
        Ok(true)
    }

    fn size(&mut self) -> Result<Position> {
        self.check_ok()?;
        Ok(self.len() as Position)
    }

    fn new_reader(&mut self, initial_pos: Position) -> Result<Box<dyn Reader + '_>> {
        self.check_ok()?;
        let mut reader = SliceReader::new(self.src.as_ref());
        reader.seek(initial_pos)?;
        Ok(Box::new(reader))
    }

    fn supports_random_access(&mut self) -> bool {
        true
    }

    fn supports_new_reader(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_whole_slice() {
        let reader = SliceReader::new(b"abcdef".as_slice());
        assert_eq!(reader.chunk(), b"abcdef");
        assert_eq!(reader.available(), 6);
        assert_eq!(reader.pos(), 0);
        assert_eq!(reader.limit_pos(), 6);
    }

    #[test]
    fn test_pull_reports_eof_without_failing() {
        let mut reader = SliceReader::new(b"ab".as_slice());
        assert!(reader.pull(2, 2).unwrap());
        reader.advance(2);
        assert!(!reader.pull(1, 1).unwrap());
        assert!(reader.ok());
    }

    #[test]
    fn test_seek_and_size() {
        let mut reader = SliceReader::new(b"abcdef".as_slice());
        assert!(reader.supports_random_access());
        assert_eq!(reader.size().unwrap(), 6);
        assert!(reader.seek(4).unwrap());
        assert_eq!(reader.chunk(), b"ef");
        // Past the end: position lands at the end, no failure.
        assert!(!reader.seek(10).unwrap());
        assert_eq!(reader.pos(), 6);
        assert!(reader.ok());
        // Backwards.
        assert!(reader.seek(1).unwrap());
        assert_eq!(reader.chunk(), b"bcdef");
    }

    #[test]
    fn test_close_freezes_window_at_pos() {
        let mut reader = SliceReader::new(b"abcdef".as_slice());
        reader.advance(3);
        reader.close().unwrap();
        assert_eq!(reader.pos(), 3);
        assert_eq!(reader.available(), 0);
        assert!(reader.chunk().is_empty());
        // Idempotent.
        reader.close().unwrap();
        assert_eq!(reader.pos(), 3);
    }

    #[test]
    fn test_new_reader_is_independent() {
        let mut reader = SliceReader::new(b"abcdef".as_slice());
        reader.advance(2);
        {
            let mut other = reader.new_reader(4).unwrap();
            assert_eq!(other.pos(), 4);
            assert_eq!(other.chunk(), b"ef");
            other.advance(2);
        }
        // The original cursor is untouched.
        assert_eq!(reader.pos(), 2);
        assert_eq!(reader.chunk(), b"cdef");
    }

    #[test]
    fn test_owned_sources() {
        let mut reader = SliceReader::new(vec![1u8, 2, 3]);
        let mut dest = [0u8; 3];
        assert_eq!(reader.read(&mut dest).unwrap(), 3);
        assert_eq!(dest, [1, 2, 3]);

        let mut reader = SliceReader::new(String::from("hi"));
        assert!(reader.pull(2, 2).unwrap());
        assert_eq!(reader.chunk(), b"hi");
    }
}
