//! A buffered writer over any [`std::io::Write`] sink.

use std::io::Write;

use oxistream_core::flush::FlushMode;
use oxistream_core::status::Result;

use crate::buffered_writer::{BufferedWriter, Sink};
use crate::options::WriterOptions;

/// The [`Sink`] seam over an [`std::io::Write`] sink.
///
/// Sequential only. `FlushMode::FromProcess` maps to the sink's own `flush`;
/// `FlushMode::FromObject` is already satisfied once the buffer is drained.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    inner: W,
}

impl<W: Write> Sink for StreamSink<W> {
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

    fn close(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// A [`Writer`](crate::Writer) over any [`std::io::Write`] sink, including
/// standard output.
pub type StreamWriter<W> = BufferedWriter<StreamSink<W>>;

impl<W: Write> StreamWriter<W> {
    /// Create a writer over `inner` with default options.
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, WriterOptions::new())
    }

    /// Create a writer over `inner`.
    pub fn with_options(inner: W, options: WriterOptions) -> Self {
        BufferedWriter::from_sink(StreamSink { inner }, options)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Writer;

    #[test]
    fn test_write_and_close() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write(b"hello ").unwrap();
        writer.write(b"world").unwrap();
        let out = writer.into_inner().unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn test_no_random_access() {
        let mut writer = StreamWriter::new(Vec::new());
        assert!(!writer.supports_random_access());
        writer.write(b"ab").unwrap();
        assert!(writer.seek(0).is_err());
        assert!(!writer.ok());
    }

    #[test]
    fn test_flush_from_process_reaches_sink() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write(b"data").unwrap();
        writer.flush(FlushMode::FromProcess).unwrap();
        assert_eq!(writer.get_ref(), b"data");
    }
}
