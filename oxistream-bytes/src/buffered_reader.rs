//! A reader template over a "fill these bytes" backend.

use oxistream_core::buffer::Buffer;
use oxistream_core::buffering::buffer_length;
use oxistream_core::flush::FlushMode;
use oxistream_core::position::{Position, MAX_POSITION};
use oxistream_core::status::{OxiStreamError, Result, StreamState};

use crate::options::ReaderOptions;
use crate::reader::Reader;

/// The backend seam of [`BufferedReader`].
///
/// A source delivers bytes into caller storage; the buffered reader owns the
/// window bookkeeping. Random access hooks have failing defaults so that
/// feature queries stay conservative.
pub trait Source {
    /// Read at least `min_length` bytes into `dest`, up to `dest.len()`.
    ///
    /// A count short of `min_length` means the data ended. Sources that can
    /// grow may deliver more on a later call.
    fn read(&mut self, min_length: usize, dest: &mut [u8]) -> Result<usize>;

    /// Whether `seek` and `size` work. May probe the backend; the answer
    /// must be stable once returned.
    fn supports_random_access(&mut self) -> bool {
        false
    }

    /// Reposition so the next `read` starts at `new_pos`, clamped to the
    /// current end of data. Returns the position actually reached.
    fn seek(&mut self, new_pos: Position) -> Result<Position> {
        let _ = new_pos;
        Err(OxiStreamError::unsupported("Reader::seek"))
    }

    /// Total size of the data.
    fn size(&mut self) -> Result<Position> {
        Err(OxiStreamError::unsupported("Reader::size"))
    }

    /// Propagate a sync request to the backend.
    fn sync(&mut self, mode: FlushMode) -> Result<()> {
        let _ = mode;
        Ok(())
    }

    /// Release the backend. Called once, from `close`.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A [`Reader`] that buffers data from a [`Source`].
///
/// The window lives in an internal [`Buffer`]; refills keep unread bytes,
/// are sized by the shared buffer policy, and large destinations bypass the
/// buffer entirely.
#[derive(Debug)]
pub struct BufferedReader<S: Source> {
    src: S,
    buf: Buffer,
    cursor: usize,
    limit: usize,
    limit_pos: Position,
    buffer_size: usize,
    size_hint: Option<Position>,
    state: StreamState,
}

impl<S: Source> BufferedReader<S> {
    /// Create a reader over `src`.
    pub fn from_source(src: S, options: ReaderOptions) -> Self {
        Self {
            src,
            buf: Buffer::new(),
            cursor: 0,
            limit: 0,
            limit_pos: options.assumed_pos().unwrap_or(0),
            buffer_size: options.buffer_size(),
            size_hint: None,
            state: StreamState::new(),
        }
    }

    /// The source being read from.
    pub fn source(&self) -> &S {
        &self.src
    }

    /// The source being read from, mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.src
    }

    /// Consume the reader and return the source. Buffered bytes are lost.
    pub fn into_source(self) -> S {
        self.src
    }

    fn clear_window(&mut self) {
        self.cursor = 0;
        self.limit = 0;
    }

    fn set_cursor_at(&mut self, pos: Position) {
        debug_assert!(pos >= self.start_pos() && pos <= self.limit_pos);
        let behind_limit = (self.limit_pos - pos) as usize;
        self.cursor = self.limit - behind_limit;
    }

    fn pull_slow(&mut self, min_length: usize, _recommended_length: usize) -> Result<bool> {
        self.state.check_ok()?;
        let available = self.limit - self.cursor;
        debug_assert!(available < min_length);
        let needed = min_length - available;
        let budget = MAX_POSITION - self.limit_pos;
        if needed as Position > budget {
            return Err(self.state.fail(OxiStreamError::position_overflow()));
        }
        let target = buffer_length(min_length, self.buffer_size, self.size_hint, self.pos());
        if self.buf.capacity() < target {
            let mut grown = Buffer::with_capacity(target);
            grown.as_mut_slice()[..available]
                .copy_from_slice(&self.buf.as_slice()[self.cursor..self.limit]);
            self.buf = grown;
        } else if self.cursor > 0 {
            self.buf.as_mut_slice().copy_within(self.cursor..self.limit, 0);
        }
        self.cursor = 0;
        self.limit = available;
        let fill = (self.buf.capacity() - available)
            .min(usize::try_from(budget).unwrap_or(usize::MAX));
        debug_assert!(fill >= needed);
        let dest = &mut self.buf.as_mut_slice()[available..available + fill];
        match self.src.read(needed, dest) {
            Ok(read) => {
                debug_assert!(read <= fill);
                self.limit += read;
                self.limit_pos += read as Position;
                Ok(self.limit - self.cursor >= min_length)
            }
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn seek_slow(&mut self, new_pos: Position) -> Result<bool> {
        self.state.check_ok()?;
        if self.src.supports_random_access() {
            self.clear_window();
            match self.src.seek(new_pos) {
                Ok(reached) => {
                    self.limit_pos = reached;
                    Ok(reached == new_pos)
                }
                Err(error) => Err(self.state.fail(error)),
            }
        } else if new_pos > self.limit_pos {
            // No random access: seek forwards by reading and discarding.
            loop {
                self.cursor = self.limit;
                if !self.pull_slow(1, 0)? {
                    return Ok(false);
                }
                if new_pos <= self.limit_pos {
                    self.set_cursor_at(new_pos);
                    return Ok(true);
                }
            }
        } else {
            Err(self
                .state
                .fail(OxiStreamError::unsupported("Reader::seek backwards")))
        }
    }
}

impl<S: Source> Reader for BufferedReader<S> {
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
        self.limit_pos = self.pos();
        self.clear_window();
        let result = self.src.close();
        self.state.mark_closed();
        self.buf = Buffer::new();
        if let Err(error) = result {
            self.state.fail(error);
        }
        self.state.close_result()
    }

    fn chunk(&self) -> &[u8] {
        &self.buf.as_slice()[self.cursor..self.limit]
    }

    fn start_to_cursor(&self) -> usize {
        self.cursor
    }

    fn limit_pos(&self) -> Position {
        self.limit_pos
    }

    fn advance(&mut self, length: usize) {
        assert!(
            length <= self.limit - self.cursor,
            "advance past the window limit: {} > {}",
            length,
            self.limit - self.cursor
        );
        self.cursor += length;
    }

    fn pull(&mut self, min_length: usize, recommended_length: usize) -> Result<bool> {
        if self.limit - self.cursor >= min_length {
            return Ok(true);
        }
        self.pull_slow(min_length, recommended_length)
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        loop {
            let from_window = self.available().min(dest.len() - copied);
            if from_window > 0 {
                dest[copied..copied + from_window].copy_from_slice(&self.chunk()[..from_window]);
                self.advance(from_window);
                copied += from_window;
            }
            if copied == dest.len() {
                return Ok(copied);
            }
            let remaining = dest.len() - copied;
            if remaining >= self.buffer_size {
                // Large destination: read into it directly instead of
                // bouncing through the buffer.
                self.state.check_ok()?;
                self.clear_window();
                let budget =
                    usize::try_from(MAX_POSITION - self.limit_pos).unwrap_or(usize::MAX);
                if budget == 0 {
                    return Err(self.state.fail(OxiStreamError::position_overflow()));
                }
                let take = remaining.min(budget);
                let read = match self.src.read(take, &mut dest[copied..copied + take]) {
                    Ok(read) => read,
                    Err(error) => return Err(self.state.fail(error)),
                };
                self.limit_pos += read as Position;
                copied += read;
                if read < take {
                    return Ok(copied);
                }
            } else if !self.pull(1, remaining)? {
                return Ok(copied);
            }
        }
    }

    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        if new_pos >= self.start_pos() && new_pos <= self.limit_pos {
            self.set_cursor_at(new_pos);
            return Ok(true);
        }
        self.seek_slow(new_pos)
    }

    fn size(&mut self) -> Result<Position> {
        if !self.src.supports_random_access() {
            return Err(self.state.fail(OxiStreamError::unsupported("Reader::size")));
        }
        self.state.check_ok()?;
        match self.src.size() {
            Ok(size) => {
                self.size_hint = Some(size);
                Ok(size)
            }
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn sync(&mut self, mode: FlushMode) -> Result<()> {
        self.state.check_ok()?;
        if self.src.supports_random_access() && self.available() > 0 {
            // Realign the backend to pos(), dropping buffered lookahead.
            let target = self.pos();
            self.clear_window();
            match self.src.seek(target) {
                Ok(reached) => self.limit_pos = reached,
                Err(error) => return Err(self.state.fail(error)),
            }
        }
        match self.src.sync(mode) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn read_hint(&mut self, min_length: usize, recommended_length: usize) {
        let want = min_length.max(recommended_length);
        let budget = usize::try_from(MAX_POSITION - self.pos()).unwrap_or(usize::MAX);
        let _ = self.pull(want.min(budget), want);
    }

    fn supports_random_access(&mut self) -> bool {
        self.src.supports_random_access()
    }
}
