//! A file-like adapter exposing a [`Writer`] through the standard I/O
//! traits.

use std::io::{self, Read, Seek, SeekFrom, Write};

use oxistream_core::flush::FlushMode;
use oxistream_core::position::Position;
use oxistream_core::status::OxiStreamError;

use crate::writer::Writer;

/// Adapts a [`Writer`] into an [`io::Read`] + [`io::Write`] + [`io::Seek`]
/// handle.
///
/// Writing goes straight to the writer. Reading switches the adapter into
/// *read-back mode*: a reader view of the sink is obtained from
/// [`Writer::read_mode`] at the current position, and reads continue from
/// that position until the next write, which first seeks the writer there
/// and leaves read-back mode.
///
/// Seeking prefers whichever mode is active. On a writer without random
/// access but with read-back support, seeking enters read-back mode, so
/// seek-before-read works even on write-only backends. `SeekFrom::End`
/// requires the writer to know its size; without that the seek fails with a
/// "not a seekable stream" error.
#[derive(Debug)]
pub struct WriterFile<W: Writer> {
    writer: W,
    /// Current read-back position; `Some` while in read-back mode.
    read_pos: Option<Position>,
    flush_mode: Option<FlushMode>,
}

fn to_io_error(error: OxiStreamError) -> io::Error {
    use oxistream_core::status::StatusCode;
    let kind = match error.code() {
        StatusCode::NotFound => io::ErrorKind::NotFound,
        StatusCode::PermissionDenied => io::ErrorKind::PermissionDenied,
        StatusCode::InvalidArgument | StatusCode::OutOfRange => io::ErrorKind::InvalidInput,
        StatusCode::Unimplemented => io::ErrorKind::Unsupported,
        StatusCode::ResourceExhausted => io::ErrorKind::OutOfMemory,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, error)
}

fn not_seekable() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "not a seekable stream")
}

fn invalid_seek(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

impl<W: Writer> WriterFile<W> {
    /// Create an adapter over `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            read_pos: None,
            flush_mode: None,
        }
    }

    /// Create an adapter that flushes with `mode` after every write.
    pub fn with_flush(writer: W, mode: FlushMode) -> Self {
        Self {
            writer,
            read_pos: None,
            flush_mode: Some(mode),
        }
    }

    /// The wrapped writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Close the wrapped writer.
    pub fn close(&mut self) -> io::Result<()> {
        self.read_pos = None;
        self.writer.close().map_err(to_io_error)
    }

    /// Consume the adapter and return the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// The position the next read or write applies to.
    fn current_pos(&self) -> Position {
        self.read_pos.unwrap_or_else(|| self.writer.pos())
    }
}

impl<W: Writer> Read for WriterFile<W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let pos = self.current_pos();
        let mut view = self.writer.read_mode(pos).map_err(to_io_error)?;
        let read = view.read(buf).map_err(to_io_error)?;
        drop(view);
        self.read_pos = Some(pos + read as Position);
        Ok(read)
    }
}

impl<W: Writer> Write for WriterFile<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(pos) = self.read_pos.take() {
            // Leave read-back mode: continue writing where reading stopped.
            match self.writer.seek(pos) {
                Ok(true) => {}
                Ok(false) => return Err(invalid_seek("write position past the sink end")),
                Err(error) => return Err(to_io_error(error)),
            }
        }
        self.writer.write(buf).map_err(to_io_error)?;
        if let Some(mode) = self.flush_mode {
            self.writer.flush(mode).map_err(to_io_error)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer
            .flush(FlushMode::FromProcess)
            .map_err(to_io_error)
    }
}

impl<W: Writer> Seek for WriterFile<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let current = self.current_pos();
        let new_pos: Position = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(delta) => {
                if delta < 0 {
                    current
                        .checked_sub(delta.unsigned_abs())
                        .ok_or_else(|| invalid_seek("seek before the start"))?
                } else {
                    current
                        .checked_add(delta as Position)
                        .ok_or_else(|| invalid_seek("position would overflow"))?
                }
            }
            SeekFrom::End(delta) => {
                if !self.writer.supports_size() {
                    return Err(not_seekable());
                }
                let size = self.writer.size().map_err(to_io_error)?;
                if delta > 0 {
                    size.checked_add(delta as Position)
                        .ok_or_else(|| invalid_seek("position would overflow"))?
                } else {
                    size.checked_sub(delta.unsigned_abs())
                        .ok_or_else(|| invalid_seek("seek before the start"))?
                }
            }
        };
        if new_pos > i64::MAX as Position {
            return Err(invalid_seek("position exceeds the addressable range"));
        }
        if new_pos == current {
            return Ok(new_pos);
        }
        if self.read_pos.is_some() {
            // Already in read-back mode: just move the read position; a read
            // past the end reports end-of-file.
            self.read_pos = Some(new_pos);
            return Ok(new_pos);
        }
        if self.writer.supports_random_access() {
            return match self.writer.seek(new_pos) {
                Ok(true) => Ok(new_pos),
                Ok(false) => Err(invalid_seek("seek past the sink end")),
                Err(error) => Err(to_io_error(error)),
            };
        }
        if self.writer.supports_read_mode() {
            // Write-only backend with a readable view: seek-before-read
            // works by entering read-back mode.
            self.read_pos = Some(new_pos);
            return Ok(new_pos);
        }
        Err(not_seekable())
    }
}
