//! A buffered reader over any [`std::io::Read`] stream.

use std::io::{self, Read};

use oxistream_core::status::Result;

use crate::buffered_reader::{BufferedReader, Source};
use crate::options::ReaderOptions;

/// The [`Source`] seam over an [`io::Read`] stream.
///
/// Sequential only: no random access, positions are byte counts from
/// construction (or from an assumed position). The end of the stream is
/// remembered so a drained stream is not polled again, unless the source is
/// declared growing.
#[derive(Debug)]
pub struct StreamSource<R: Read> {
    inner: R,
    eof: bool,
    growing: bool,
}

impl<R: Read> Source for StreamSource<R> {
    fn read(&mut self, min_length: usize, dest: &mut [u8]) -> Result<usize> {
        if self.eof && !self.growing {
            return Ok(0);
        }
        let mut total = 0;
        while total < min_length {
            match self.inner.read(&mut dest[total..]) {
                Ok(0) => {
                    if !self.growing {
                        self.eof = true;
                    }
                    break;
                }
                Ok(read) => total += read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error.into()),
            }
        }
        Ok(total)
    }
}

/// A [`Reader`](crate::Reader) over any [`io::Read`] stream, including
/// standard input.
///
/// Use [`ReaderOptions::with_assumed_pos`] to report positions relative to a
/// logical origin other than the first byte read.
pub type StreamReader<R> = BufferedReader<StreamSource<R>>;

impl<R: Read> StreamReader<R> {
    /// Create a reader over `inner` with default options.
    pub fn new(inner: R) -> Self {
        Self::with_options(inner, ReaderOptions::new())
    }

    /// Create a reader over `inner`.
    pub fn with_options(inner: R, options: ReaderOptions) -> Self {
        let source = StreamSource {
            inner,
            eof: false,
            growing: options.growing_source(),
        };
        BufferedReader::from_source(source, options)
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.source().inner
    }

    /// The underlying stream, mutably. Reading from it directly desyncs the
    /// reported positions.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source_mut().inner
    }

    /// Consume the reader and return the stream. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.into_source().inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use std::io::Cursor;

    #[test]
    fn test_sequential_reading() {
        let mut reader = StreamReader::new(Cursor::new(b"stream data".to_vec()));
        let mut dest = [0u8; 6];
        assert_eq!(reader.read(&mut dest).unwrap(), 6);
        assert_eq!(&dest, b"stream");
        assert_eq!(reader.pos(), 6);
        assert!(!reader.supports_random_access());
    }

    #[test]
    fn test_short_read_then_eof() {
        let mut reader = StreamReader::new(Cursor::new(b"7 bytes".to_vec()));
        let mut dest = [0u8; 10];
        assert_eq!(reader.read(&mut dest).unwrap(), 7);
        assert_eq!(reader.pos(), 7);
        assert!(reader.ok());
        assert!(!reader.pull(1, 1).unwrap());
        assert!(reader.ok());
    }

    #[test]
    fn test_eof_is_remembered() {
        // An exhausted source is not polled again.
        struct CountingEof {
            polls_after_empty: usize,
        }
        impl Read for CountingEof {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                self.polls_after_empty += 1;
                Ok(0)
            }
        }
        let mut reader = StreamReader::new(CountingEof {
            polls_after_empty: 0,
        });
        assert!(!reader.pull(1, 1).unwrap());
        assert!(!reader.pull(1, 1).unwrap());
        assert!(!reader.pull(1, 1).unwrap());
        assert_eq!(reader.get_ref().polls_after_empty, 1);
    }
}
