//! A buffered writer over seekable sinks.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use oxistream_core::flush::FlushMode;
use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result};

use crate::buffered_writer::{BufferedWriter, Sink};
use crate::options::WriterOptions;

/// The [`Sink`] seam over an [`std::io::Write`] + [`std::io::Seek`] sink.
///
/// Seeking clamps at the current sink size; there is no generic way to set
/// the length of an arbitrary seekable sink, so `truncate` stays
/// unsupported.
#[derive(Debug)]
pub struct FileSink<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> Sink for FileSink<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self, mode: FlushMode) -> Result<()> {
        match mode {
            FlushMode::FromObject => Ok(()),
            FlushMode::FromProcess => {
                self.inner.flush()?;
                Ok(())
            }
        }
    }

    fn supports_random_access(&mut self) -> bool {
        true
    }

    fn seek(&mut self, new_pos: Position) -> Result<Position> {
        let end = self.inner.seek(SeekFrom::End(0))?;
        let target = new_pos.min(end);
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(target)
    }

    fn size(&mut self) -> Result<Position> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// A [`Writer`](crate::Writer) over a seekable sink, typically a [`File`].
///
/// Supports random access and `size`.
pub type FileWriter<W> = BufferedWriter<FileSink<W>>;

impl<W: Write + Seek> FileWriter<W> {
    /// Create a writer over `inner` with default options.
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, WriterOptions::new())
    }

    /// Create a writer over `inner`.
    pub fn with_options(inner: W, options: WriterOptions) -> Self {
        BufferedWriter::from_sink(FileSink { inner }, options)
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink().inner
    }

    /// Close the writer and return the sink.
    pub fn into_inner(self) -> Result<W> {
        Ok(self.into_sink()?.inner)
    }
}

impl FileWriter<File> {
    /// Create or truncate the file at `path` for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).map_err(OxiStreamError::from)?;
        Ok(Self::new(file))
    }
}
