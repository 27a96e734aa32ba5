//! A writer into a growable in-memory byte vector.

use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result, StreamState};

use crate::reader::Reader;
use crate::slice_reader::SliceReader;
use crate::writer::Writer;

/// A [`Writer`] appending into an owned `Vec<u8>`.
///
/// The window is the vector's spare room, so small writes are plain memory
/// copies. Supports random access, `size`, `truncate` and `read_mode`; the
/// size is the high-water mark of everything written through any position.
#[derive(Debug, Default)]
pub struct VecWriter {
    /// Storage; `dest.len()` is the window limit, real data is tracked by
    /// `written`/`cursor`.
    dest: Vec<u8>,
    cursor: usize,
    /// High-water mark of bytes actually written, excluding the cursor.
    written: usize,
    state: StreamState,
}

impl VecWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes before the first
    /// reallocation.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dest: Vec::with_capacity(capacity),
            cursor: 0,
            written: 0,
            state: StreamState::new(),
        }
    }

    /// Create a writer appending after the existing contents of `dest`.
    pub fn from_vec(dest: Vec<u8>) -> Self {
        let written = dest.len();
        Self {
            dest,
            cursor: written,
            written,
            state: StreamState::new(),
        }
    }

    /// Fold the cursor into the high-water mark.
    fn commit(&mut self) {
        self.written = self.written.max(self.cursor);
    }

    /// Bytes written so far, through any position.
    pub fn written_size(&self) -> usize {
        self.written.max(self.cursor)
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.dest[..self.written_size()]
    }

    /// Consume the writer and return the written bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.commit();
        self.dest.truncate(self.written);
        self.dest
    }
}

impl Writer for VecWriter {
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
        self.commit();
        self.dest.truncate(self.written);
        self.state.mark_closed();
        self.state.close_result()
    }

    fn space(&mut self) -> &mut [u8] {
        if !self.state.is_open() {
            return &mut [];
        }
        let cursor = self.cursor;
        &mut self.dest[cursor..]
    }

    fn available(&self) -> usize {
        if self.state.is_open() {
            self.dest.len() - self.cursor
        } else {
            0
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
            self.dest.len() as Position
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

    fn push(&mut self, min_length: usize, _recommended_length: usize) -> Result<()> {
        if self.dest.len() - self.cursor >= min_length {
            self.state.check_ok()?;
            return Ok(());
        }
        self.state.check_ok()?;
        let needed = self.cursor + min_length;
        self.dest.reserve(needed - self.dest.len());
        // Expose the whole grown capacity as the window.
        let capacity = self.dest.capacity();
        self.dest.resize(capacity, 0);
        Ok(())
    }

    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        self.state.check_ok()?;
        self.commit();
        if new_pos > self.written as Position {
            self.cursor = self.written;
            return Ok(false);
        }
        self.cursor = new_pos as usize;
        Ok(true)
    }

    fn size(&mut self) -> Result<Position> {
        self.state.check_ok()?;
        self.commit();
        Ok(self.written as Position)
    }

    fn truncate(&mut self, new_size: Position) -> Result<bool> {
        self.state.check_ok()?;
        self.commit();
        if new_size > self.written as Position {
            return Ok(false);
        }
        self.written = new_size as usize;
        self.cursor = self.written;
        Ok(true)
    }

    fn read_mode(&mut self, initial_pos: Position) -> Result<Box<dyn Reader + '_>> {
        self.state.check_ok()?;
        self.commit();
        let written = self.written;
        let mut reader = SliceReader::new(&self.dest[..written]);
        // Past-end positions clamp to the end, matching seek semantics.
        reader.seek(initial_pos)?;
        Ok(Box::new(reader))
    }

    fn supports_random_access(&mut self) -> bool {
        true
    }

    fn supports_read_mode(&mut self) -> bool {
        true
    }

    fn supports_truncate(&mut self) -> bool {
        true
    }
}
