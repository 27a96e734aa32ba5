//! A writer template over a "drain these bytes" backend.

use oxistream_core::buffer::Buffer;
use oxistream_core::buffering::buffer_length;
use oxistream_core::flush::FlushMode;
use oxistream_core::position::{Position, MAX_POSITION};
use oxistream_core::status::{OxiStreamError, Result, StreamState};

use crate::options::WriterOptions;
use crate::writer::Writer;

/// The backend seam of [`BufferedWriter`].
///
/// A sink accepts fully formed byte runs; the buffered writer owns the
/// window bookkeeping. The optional hooks are called only at buffer-drained
/// points and have failing defaults so that feature queries stay
/// conservative.
pub trait Sink {
    /// Accept all of `data`. Short writes never succeed: either the whole
    /// run is accepted or an error is returned.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Propagate a flush to the depth selected by `mode`.
    fn flush(&mut self, mode: FlushMode) -> Result<()> {
        let _ = mode;
        Ok(())
    }

    /// Whether `seek` and `size` work.
    fn supports_random_access(&mut self) -> bool {
        false
    }

    /// Reposition so the next `write` lands at `new_pos`, clamped to the
    /// current sink size. Returns the position actually reached.
    fn seek(&mut self, new_pos: Position) -> Result<Position> {
        let _ = new_pos;
        Err(OxiStreamError::unsupported("Writer::seek"))
    }

    /// Total size of the sink.
    fn size(&mut self) -> Result<Position> {
        Err(OxiStreamError::unsupported("Writer::size"))
    }

    /// Whether `truncate` works.
    fn supports_truncate(&mut self) -> bool {
        false
    }

    /// Discard everything past `new_size`. `Ok(false)` when `new_size`
    /// exceeds the current sink size.
    fn truncate(&mut self, new_size: Position) -> Result<bool> {
        let _ = new_size;
        Err(OxiStreamError::unsupported("Writer::truncate"))
    }

    /// Release the backend. Called once, from `close`.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A [`Writer`] that buffers data before draining it into a [`Sink`].
///
/// Buffer refills are sized by the shared buffer policy: with a declared
/// size hint the buffers land exactly on the hint, and runs of at least one
/// buffer length skip the buffer entirely ("write-through").
#[derive(Debug)]
pub struct BufferedWriter<S: Sink> {
    sink: S,
    buf: Buffer,
    cursor: usize,
    limit: usize,
    start_pos: Position,
    buffer_size: usize,
    size_hint: Option<Position>,
    state: StreamState,
}

impl<S: Sink> BufferedWriter<S> {
    /// Create a writer over `sink`.
    pub fn from_sink(sink: S, options: WriterOptions) -> Self {
        Self {
            sink,
            buf: Buffer::new(),
            cursor: 0,
            limit: 0,
            start_pos: 0,
            buffer_size: options.buffer_size(),
            size_hint: options.size_hint(),
            state: StreamState::new(),
        }
    }

    /// The sink being written to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink being written to, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Close the writer and return the sink.
    pub fn into_sink(mut self) -> Result<S> {
        self.close()?;
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: self is consumed and its Drop is suppressed; close()
        // released the buffer, so only the sink remains to move out.
        Ok(unsafe { std::ptr::read(&this.sink) })
    }

    /// Drain the buffered bytes into the sink and empty the window.
    fn sync_buffer(&mut self) -> Result<()> {
        let filled = self.cursor;
        self.cursor = 0;
        self.limit = 0;
        if filled == 0 {
            return Ok(());
        }
        self.state.check_ok()?;
        match self.sink.write(&self.buf.as_slice()[..filled]) {
            Ok(()) => {
                self.start_pos += filled as Position;
                Ok(())
            }
            Err(error) => Err(self.state.fail(error)),
        }
    }

    /// The run length at which writing straight to the sink beats buffering.
    ///
    /// At least every other sink write then has length `buffer_size`; near a
    /// known size hint the threshold shrinks so the number of sink writes
    /// does not grow.
    fn length_to_write_directly(&self) -> usize {
        if let Some(hint) = self.size_hint {
            if self.pos() < hint && (self.cursor == 0 || self.limit_pos() < hint) {
                let remaining = usize::try_from(hint - self.pos()).unwrap_or(usize::MAX);
                return self.buffer_size.min(remaining);
            }
        }
        self.buffer_size
    }

    fn push_slow(&mut self, min_length: usize, _recommended_length: usize) -> Result<()> {
        self.sync_buffer()?;
        self.state.check_ok()?;
        let budget = MAX_POSITION - self.start_pos;
        if min_length as Position > budget {
            return Err(self.state.fail(OxiStreamError::position_overflow()));
        }
        let length = buffer_length(min_length, self.buffer_size, self.size_hint, self.start_pos);
        self.buf.reset(length);
        // Advertise up to twice the refill unit so large direct writes can
        // skip the buffer.
        self.limit = self
            .buf
            .capacity()
            .min(length.saturating_add(length))
            .min(usize::try_from(budget).unwrap_or(usize::MAX));
        Ok(())
    }

    fn write_buffered(&mut self, mut src: &[u8]) -> Result<()> {
        loop {
            let available = self.limit - self.cursor;
            if src.len() <= available {
                self.buf.as_mut_slice()[self.cursor..self.cursor + src.len()]
                    .copy_from_slice(src);
                self.cursor += src.len();
                return Ok(());
            }
            self.buf.as_mut_slice()[self.cursor..self.limit]
                .copy_from_slice(&src[..available]);
            self.cursor = self.limit;
            src = &src[available..];
            self.push_slow(1, src.len())?;
        }
    }
}

impl<S: Sink> Writer for BufferedWriter<S> {
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
        if self.sync_buffer().is_ok() {
            if let Err(error) = self.sink.flush(FlushMode::FromObject) {
                self.state.fail(error);
            }
        }
        if let Err(error) = self.sink.close() {
            self.state.fail(error);
        }
        self.state.mark_closed();
        self.buf = Buffer::new();
        self.state.close_result()
    }

    fn space(&mut self) -> &mut [u8] {
        let (cursor, limit) = (self.cursor, self.limit);
        &mut self.buf.as_mut_slice()[cursor..limit]
    }

    fn available(&self) -> usize {
        self.limit - self.cursor
    }

    fn start_to_cursor(&self) -> usize {
        self.cursor
    }

    fn limit_pos(&self) -> Position {
        self.start_pos + self.limit as Position
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

    fn push(&mut self, min_length: usize, recommended_length: usize) -> Result<()> {
        if self.limit - self.cursor >= min_length {
            return Ok(());
        }
        self.push_slow(min_length, recommended_length)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        let available = self.limit - self.cursor;
        if src.len() <= available {
            if !src.is_empty() {
                self.buf.as_mut_slice()[self.cursor..self.cursor + src.len()]
                    .copy_from_slice(src);
                self.cursor += src.len();
            }
            return Ok(());
        }
        if src.len() >= self.length_to_write_directly() {
            self.sync_buffer()?;
            self.state.check_ok()?;
            if src.len() as Position > MAX_POSITION - self.start_pos {
                return Err(self.state.fail(OxiStreamError::position_overflow()));
            }
            return match self.sink.write(src) {
                Ok(()) => {
                    self.start_pos += src.len() as Position;
                    Ok(())
                }
                Err(error) => Err(self.state.fail(error)),
            };
        }
        self.write_buffered(src)
    }

    fn flush(&mut self, mode: FlushMode) -> Result<()> {
        self.sync_buffer()?;
        self.state.check_ok()?;
        match self.sink.flush(mode) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        if new_pos == self.pos() {
            self.check_ok()?;
            return Ok(true);
        }
        self.state.check_ok()?;
        if !self.sink.supports_random_access() {
            return Err(self.state.fail(OxiStreamError::unsupported("Writer::seek")));
        }
        self.sync_buffer()?;
        match self.sink.seek(new_pos) {
            Ok(reached) => {
                self.start_pos = reached;
                Ok(reached == new_pos)
            }
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn size(&mut self) -> Result<Position> {
        self.state.check_ok()?;
        self.sync_buffer()?;
        match self.sink.size() {
            Ok(size) => Ok(size),
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn truncate(&mut self, new_size: Position) -> Result<bool> {
        self.state.check_ok()?;
        self.sync_buffer()?;
        match self.sink.truncate(new_size) {
            Ok(truncated) => {
                if truncated {
                    self.start_pos = new_size;
                }
                Ok(truncated)
            }
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn supports_random_access(&mut self) -> bool {
        self.sink.supports_random_access()
    }

    fn supports_truncate(&mut self) -> bool {
        self.sink.supports_truncate()
    }
}

impl<S: Sink> Drop for BufferedWriter<S> {
    fn drop(&mut self) {
        // Best-effort drain on drop; Close() reports errors properly.
        if self.state.is_open() {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A sink recording every write it receives.
    #[derive(Default)]
    struct RecordingSink {
        data: Vec<u8>,
        writes: Vec<usize>,
        flushes: Vec<FlushMode>,
    }

    impl Sink for RecordingSink {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.writes.push(data.len());
            self.data.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self, mode: FlushMode) -> Result<()> {
            self.flushes.push(mode);
            Ok(())
        }
    }

    fn writer_with(options: WriterOptions) -> BufferedWriter<RecordingSink> {
        BufferedWriter::from_sink(RecordingSink::default(), options)
    }

    #[test]
    fn test_small_writes_coalesce() {
        let mut writer = writer_with(WriterOptions::new().with_buffer_size(4096));
        for _ in 0..100 {
            writer.write(b"0123456789").unwrap();
        }
        writer.close().unwrap();
        assert_eq!(writer.sink().data.len(), 1000);
        assert!(writer.sink().writes.len() <= 2, "writes: {:?}", writer.sink().writes);
    }

    #[test]
    fn test_size_hint_bounds_sink_writes() {
        // 3000 + 2000 bytes against a 4096 buffer with hint 6000: the sink
        // sees one write of >= 4096 and then at most one more.
        let mut writer = writer_with(
            WriterOptions::new()
                .with_buffer_size(4096)
                .with_size_hint(6000),
        );
        writer.write(&[1u8; 3000]).unwrap();
        writer.write(&[2u8; 2000]).unwrap();
        writer.close().unwrap();
        let writes = &writer.sink().writes;
        assert_eq!(writer.sink().data.len(), 5000);
        assert!(writes.len() <= 2, "writes: {writes:?}");
        assert!(writes[0] >= 4096, "writes: {writes:?}");
    }

    #[test]
    fn test_large_write_goes_directly() {
        let mut writer = writer_with(WriterOptions::new().with_buffer_size(256));
        writer.write(b"small").unwrap();
        writer.write(&[7u8; 4096]).unwrap();
        writer.close().unwrap();
        // The buffered prefix was synced first, then the big run went in one
        // piece.
        assert!(writer.sink().writes.contains(&4096), "writes: {:?}", writer.sink().writes);
        assert_eq!(writer.sink().data.len(), 5 + 4096);
    }

    #[test]
    fn test_flush_from_object_is_noop_when_clean() {
        let mut writer = writer_with(WriterOptions::new());
        writer.write(b"abc").unwrap();
        writer.flush(FlushMode::FromObject).unwrap();
        assert_eq!(writer.sink().data, b"abc");
        // Nothing buffered: flushing again writes nothing new.
        writer.flush(FlushMode::FromObject).unwrap();
        assert_eq!(writer.sink().writes.len(), 1);
        assert!(writer.ok());
    }

    #[test]
    fn test_failed_writer_short_circuits() {
        struct FailingSink;
        impl Sink for FailingSink {
            fn write(&mut self, _data: &[u8]) -> Result<()> {
                Err(OxiStreamError::data_loss("sink broke"))
            }
        }
        let mut writer =
            BufferedWriter::from_sink(FailingSink, WriterOptions::new().with_buffer_size(8));
        let error = writer.write(&[0u8; 64]).unwrap_err();
        assert!(error.to_string().contains("sink broke"));
        assert!(!writer.ok());
        // All later mutations short-circuit with the sticky error.
        let error = writer.write(b"x").unwrap_err();
        assert!(error.to_string().contains("sink broke"));
        let error = writer.flush(FlushMode::FromProcess).unwrap_err();
        assert!(error.to_string().contains("sink broke"));
        // Close still transitions and keeps reporting the error.
        assert!(writer.close().is_err());
        assert!(writer.close().is_err());
    }

    #[test]
    fn test_positions_track_buffered_bytes() {
        let mut writer = writer_with(WriterOptions::new().with_buffer_size(4096));
        assert_eq!(writer.pos(), 0);
        writer.write(b"hello").unwrap();
        assert_eq!(writer.pos(), 5);
        writer.flush(FlushMode::FromObject).unwrap();
        assert_eq!(writer.pos(), 5);
        assert_eq!(writer.start_pos(), 5);
    }

    #[test]
    fn test_into_sink_closes_first() {
        let mut writer = writer_with(WriterOptions::new());
        writer.write(b"tail").unwrap();
        let sink = writer.into_sink().unwrap();
        assert_eq!(sink.data, b"tail");
    }
}
