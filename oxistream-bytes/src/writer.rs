//! The push-model byte sink contract.
//!
//! A [`Writer`] exposes a writable window — [`space`] — and a cursor that
//! the caller advances as it produces bytes. When the window fills up the
//! caller invokes [`push`], which asks the concrete writer to make at least
//! `min_length` bytes of window available. Writers have no end-of-stream
//! notion: `push` either succeeds or the writer fails.
//!
//! [`space`]: Writer::space
//! [`push`]: Writer::push
//!
//! The cursor window mirrors the reader side: `[cursor, limit)` is writable,
//! `[start, cursor)` holds bytes produced but not yet drained, and positions
//! derive from `limit_pos`.
//!
//! # Example
//!
//! ```
//! use oxistream_bytes::{VecWriter, Writer};
//!
//! let mut writer = VecWriter::new();
//! writer.write(b"hello").unwrap();
//! writer.close().unwrap();
//! assert_eq!(writer.into_vec(), b"hello");
//! ```

use oxistream_core::chain::Chain;
use oxistream_core::flush::FlushMode;
use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result};

use crate::reader::Reader;

/// Shared zero block for [`Writer::write_zeros`].
const ZEROS: [u8; 4096] = [0; 4096];

/// A push-model byte sink with a caller-visible cursor window.
///
/// Object-safe: writers of different concrete types can be handled through
/// `&mut dyn Writer`.
pub trait Writer {
    // --- State ---

    /// Whether the writer has not been closed.
    fn is_open(&self) -> bool;

    /// The recorded failure, if any. Survives `close`.
    fn error(&self) -> Option<&OxiStreamError>;

    /// Whether the writer is open and has not failed.
    fn ok(&self) -> bool {
        self.is_open() && self.error().is_none()
    }

    /// Record a sticky failure and return it for propagation. If a failure
    /// was already recorded, the original one is returned.
    fn fail(&mut self, error: OxiStreamError) -> OxiStreamError;

    /// Fail unless the writer is open and healthy.
    fn check_ok(&self) -> Result<()> {
        if let Some(error) = self.error() {
            return Err(error.clone());
        }
        if !self.is_open() {
            return Err(OxiStreamError::object_closed());
        }
        Ok(())
    }

    /// Close the writer: drain buffered bytes through the slow path, release
    /// owned resources. Idempotent; a previously failed writer keeps
    /// reporting its sticky error.
    fn close(&mut self) -> Result<()>;

    // --- Window ---

    /// The writable bytes: the `[cursor, limit)` window.
    fn space(&mut self) -> &mut [u8];

    /// Number of writable bytes, `limit - cursor`.
    fn available(&self) -> usize;

    /// Bytes produced into the window so far, `cursor - start`.
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

    /// Commit `length` bytes written into the window.
    ///
    /// # Panics
    ///
    /// Panics if `length > available()`.
    fn advance(&mut self, length: usize);

    // --- Operations ---

    /// Ensure at least `min_length` bytes of writable window.
    ///
    /// `recommended_length` is advisory. There is no end-of-stream on the
    /// write side: the call succeeds or the writer fails.
    fn push(&mut self, min_length: usize, recommended_length: usize) -> Result<()>;

    /// Write all of `src`. Short writes never succeed: on return the bytes
    /// are accepted in full, or the writer has failed.
    fn write(&mut self, mut src: &[u8]) -> Result<()> {
        loop {
            let available = self.available();
            if src.len() <= available {
                if !src.is_empty() {
                    self.space()[..src.len()].copy_from_slice(src);
                    self.advance(src.len());
                }
                return Ok(());
            }
            self.space().copy_from_slice(&src[..available]);
            self.advance(available);
            src = &src[available..];
            self.push(1, src.len())?;
        }
    }

    /// Write all blocks of `src` in order.
    ///
    /// Implementations that store blocks may share large ones instead of
    /// copying.
    fn write_chain(&mut self, src: &Chain) -> Result<()> {
        for block in src.blocks() {
            self.write(block)?;
        }
        Ok(())
    }

    /// Write `length` zero bytes.
    fn write_zeros(&mut self, mut length: Position) -> Result<()> {
        while length > 0 {
            let chunk_length = ZEROS.len().min(usize::try_from(length).unwrap_or(usize::MAX));
            self.write(&ZEROS[..chunk_length])?;
            length -= chunk_length as Position;
        }
        Ok(())
    }

    /// Drain buffered bytes and propagate to the depth selected by `mode`.
    ///
    /// On an up-to-date writer, `flush(FlushMode::FromObject)` is a no-op
    /// that reports success.
    fn flush(&mut self, mode: FlushMode) -> Result<()> {
        let _ = mode;
        self.check_ok()
    }

    /// Reposition to `new_pos`.
    ///
    /// Returns `Ok(false)` when `new_pos` is past the current sink size; the
    /// position is then at the end and the writer stays healthy. Seeking to
    /// the current position always succeeds.
    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        if new_pos == self.pos() {
            self.check_ok()?;
            return Ok(true);
        }
        Err(self.fail(OxiStreamError::unsupported("Writer::seek")))
    }

    /// Total sink size in bytes, counting bytes written through any past
    /// position, when the sink can tell.
    fn size(&mut self) -> Result<Position> {
        Err(self.fail(OxiStreamError::unsupported("Writer::size")))
    }

    /// Discard everything past `new_size`.
    ///
    /// Returns `Ok(false)` without side effects when `new_size` exceeds the
    /// current size.
    fn truncate(&mut self, new_size: Position) -> Result<bool> {
        let _ = new_size;
        Err(self.fail(OxiStreamError::unsupported("Writer::truncate")))
    }

    /// A reader view of the bytes written so far, positioned at
    /// `initial_pos` (clamped to the written size).
    ///
    /// The view borrows the writer, so any later mutation of the writer —
    /// including flushing — first requires dropping the view; a stale view
    /// can never observe a sink changed under it.
    fn read_mode(&mut self, initial_pos: Position) -> Result<Box<dyn Reader + '_>> {
        let _ = initial_pos;
        Err(self.fail(OxiStreamError::unsupported("Writer::read_mode")))
    }

    // --- Feature queries ---

    /// Whether `seek` and `size` are supported.
    fn supports_random_access(&mut self) -> bool {
        false
    }

    /// Whether `read_mode` is supported.
    fn supports_read_mode(&mut self) -> bool {
        false
    }

    /// Whether `truncate` is supported.
    fn supports_truncate(&mut self) -> bool {
        false
    }

    /// Whether `size` is supported.
    fn supports_size(&mut self) -> bool {
        self.supports_random_access()
    }
}
