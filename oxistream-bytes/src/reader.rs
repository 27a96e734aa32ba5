//! The pull-model byte source contract.
//!
//! A [`Reader`] exposes a window of already-buffered bytes — [`chunk`] — and
//! a cursor that the caller advances as it consumes them. When the window
//! runs dry the caller invokes [`pull`], which asks the concrete reader to
//! make at least `min_length` bytes available. End of stream is not a
//! failure: `pull` reports it as `Ok(false)` while the reader stays healthy.
//!
//! [`chunk`]: Reader::chunk
//! [`pull`]: Reader::pull
//!
//! # The cursor window
//!
//! Every reader tracks four quantities: the window start, the cursor, the
//! window limit, and `limit_pos`, the stream position corresponding to the
//! limit. The visible slice is `[cursor, limit)`; positions derive from
//! `limit_pos`:
//!
//! ```text
//!   start        cursor          limit
//!     |------------|---------------|
//!     [  consumed  ][  available   ]
//!                                  ^-- stream position limit_pos
//! ```
//!
//! After every operation `pos()` equals the number of bytes logically
//! consumed since construction plus any assumed initial position.
//!
//! # Example
//!
//! ```
//! use oxistream_bytes::{Reader, SliceReader};
//!
//! let mut reader = SliceReader::new(b"hello world".as_slice());
//! let mut dest = [0u8; 5];
//! reader.read(&mut dest).unwrap();
//! assert_eq!(&dest, b"hello");
//! assert_eq!(reader.pos(), 5);
//! ```

use oxistream_core::chain::Chain;
use oxistream_core::flush::FlushMode;
use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result};

use crate::writer::Writer;

/// A pull-model byte source with a caller-visible cursor window.
///
/// Object-safe: readers of different concrete types can be handled through
/// `&mut dyn Reader`.
pub trait Reader {
    // --- State ---

    /// Whether the reader has not been closed.
    fn is_open(&self) -> bool;

    /// The recorded failure, if any. Survives `close`.
    fn error(&self) -> Option<&OxiStreamError>;

    /// Whether the reader is open and has not failed. End of stream does not
    /// affect this.
    fn ok(&self) -> bool {
        self.is_open() && self.error().is_none()
    }

    /// Record a sticky failure and return it for propagation. If a failure
    /// was already recorded, the original one is returned.
    fn fail(&mut self, error: OxiStreamError) -> OxiStreamError;

    /// Fail unless the reader is open and healthy.
    fn check_ok(&self) -> Result<()> {
        if let Some(error) = self.error() {
            return Err(error.clone());
        }
        if !self.is_open() {
            return Err(OxiStreamError::object_closed());
        }
        Ok(())
    }

    /// Close the reader, releasing owned resources. Idempotent; a previously
    /// failed reader keeps reporting its sticky error.
    fn close(&mut self) -> Result<()>;

    // --- Window ---

    /// The available bytes: the `[cursor, limit)` window.
    fn chunk(&self) -> &[u8];

    /// Number of available bytes, `limit - cursor`.
    #[inline]
    fn available(&self) -> usize {
        self.chunk().len()
    }

    /// Bytes between the window start and the cursor.
    fn start_to_cursor(&self) -> usize;

    /// Total window length, `limit - start`.
    #[inline]
    fn start_to_limit(&self) -> usize {
        self.start_to_cursor() + self.available()
    }

    /// Stream position corresponding to the window limit.
    fn limit_pos(&self) -> Position;

    /// Current stream position: `limit_pos - (limit - cursor)`.
    #[inline]
    fn pos(&self) -> Position {
        self.limit_pos() - self.available() as Position
    }

    /// Stream position corresponding to the window start.
    #[inline]
    fn start_pos(&self) -> Position {
        self.limit_pos() - self.start_to_limit() as Position
    }

    /// Consume `length` bytes from the window.
    ///
    /// # Panics
    ///
    /// Panics if `length > available()`.
    fn advance(&mut self, length: usize);

    // --- Operations ---

    /// Ensure at least `min_length` bytes are available.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when the stream ends
    /// before `min_length` bytes are available (the reader stays healthy and
    /// whatever the stream still had is in the window). `recommended_length`
    /// is advisory: implementations may buffer more or less.
    fn pull(&mut self, min_length: usize, recommended_length: usize) -> Result<bool>;

    /// Fill `dest`, returning the number of bytes delivered.
    ///
    /// A count short of `dest.len()` means the stream ended. On failure the
    /// position still reflects the bytes delivered before the error.
    fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        while copied < dest.len() {
            if self.available() == 0 && !self.pull(1, dest.len() - copied)? {
                break;
            }
            let length = self.available().min(dest.len() - copied);
            dest[copied..copied + length].copy_from_slice(&self.chunk()[..length]);
            self.advance(length);
            copied += length;
        }
        Ok(copied)
    }

    /// Append up to `length` bytes to `dest`, returning the number appended.
    ///
    /// Implementations that already own their data in blocks may append
    /// shared blocks instead of copying.
    fn read_chain(&mut self, length: usize, dest: &mut Chain) -> Result<usize> {
        let mut copied = 0;
        while copied < length {
            if self.available() == 0 && !self.pull(1, length - copied)? {
                break;
            }
            let chunk_length = self.available().min(length - copied);
            dest.append_slice(&self.chunk()[..chunk_length]);
            self.advance(chunk_length);
            copied += chunk_length;
        }
        Ok(copied)
    }

    /// Pump up to `length` bytes into `dest`, returning the number pumped.
    ///
    /// A short count means this reader ended; a failure of either side is
    /// returned as the error.
    fn copy_to(&mut self, length: Position, dest: &mut dyn Writer) -> Result<Position> {
        let mut copied: Position = 0;
        while copied < length {
            if self.available() == 0 {
                let want = usize::try_from(length - copied).unwrap_or(usize::MAX);
                if !self.pull(1, want)? {
                    break;
                }
            }
            let remaining = usize::try_from(length - copied).unwrap_or(usize::MAX);
            let chunk_length = self.available().min(remaining);
            dest.write(&self.chunk()[..chunk_length])?;
            self.advance(chunk_length);
            copied += chunk_length as Position;
        }
        Ok(copied)
    }

    /// Advance the position by `length` bytes.
    ///
    /// Returns `Ok(false)` when the stream ends first, with the position at
    /// the end.
    fn skip(&mut self, length: Position) -> Result<bool> {
        if let Ok(short) = usize::try_from(length) {
            if short <= self.available() {
                self.advance(short);
                return Ok(true);
            }
        }
        match self.pos().checked_add(length) {
            Some(new_pos) => self.seek(new_pos),
            None => Err(self.fail(OxiStreamError::position_overflow())),
        }
    }

    /// Reposition to `new_pos`.
    ///
    /// Returns `Ok(false)` when `new_pos` is past the end of a non-growing
    /// stream; the position is then at the end and the reader stays healthy.
    /// Seeking to the current position always succeeds, even without random
    /// access support.
    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        if new_pos == self.pos() {
            self.check_ok()?;
            return Ok(true);
        }
        Err(self.fail(OxiStreamError::unsupported("Reader::seek")))
    }

    /// Total stream size in bytes, when the source can tell.
    fn size(&mut self) -> Result<Position> {
        Err(self.fail(OxiStreamError::unsupported("Reader::size")))
    }

    /// Flush read-side effects, e.g. realign the underlying handle to
    /// `pos()`, without closing.
    fn sync(&mut self, mode: FlushMode) -> Result<()> {
        let _ = mode;
        self.check_ok()
    }

    /// Hint that the caller intends to read at least `min_length` and likely
    /// `recommended_length` bytes soon. Never required for correctness.
    fn read_hint(&mut self, min_length: usize, recommended_length: usize) {
        let _ = (min_length, recommended_length);
    }

    /// An independent reader over the same data, positioned at
    /// `initial_pos`, with its own cursor and buffers.
    fn new_reader(&mut self, initial_pos: Position) -> Result<Box<dyn Reader + '_>> {
        let _ = initial_pos;
        Err(self.fail(OxiStreamError::unsupported("Reader::new_reader")))
    }

    // --- Feature queries ---

    /// Whether `seek` can move both forwards and backwards and `size` is
    /// supported.
    fn supports_random_access(&mut self) -> bool {
        false
    }

    /// Whether `new_reader` is supported.
    fn supports_new_reader(&mut self) -> bool {
        false
    }

    /// Whether `seek` can move backwards.
    fn supports_rewind(&mut self) -> bool {
        self.supports_random_access()
    }

    /// Whether `size` is supported.
    fn supports_size(&mut self) -> bool {
        self.supports_random_access()
    }
}
