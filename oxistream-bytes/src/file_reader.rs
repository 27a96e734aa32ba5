//! A buffered reader over seekable streams, with lazily probed random
//! access.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use oxistream_core::lazy::LazyBool;
use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result};

use crate::buffered_reader::{BufferedReader, Source};
use crate::options::ReaderOptions;

/// The [`Source`] seam over an [`io::Read`] + [`io::Seek`] stream.
///
/// Whether seeking actually works is only discoverable by trying — a file
/// handle may be backed by a pipe. The first `seek`/`size` query performs a
/// tentative seek-to-end and seek-back; success resolves the capability to
/// `true` and caches the discovered size, failure resolves it to `false`
/// permanently. Closing collapses an unresolved state to `false` so a dead
/// handle is never probed.
#[derive(Debug)]
pub struct FileSource<R: Read + Seek> {
    inner: R,
    pos: Position,
    random_access: LazyBool,
    size: Option<Position>,
    growing: bool,
}

impl<R: Read + Seek> FileSource<R> {
    /// Remember a discovered size. For a growing source the size is only a
    /// transient observation and is not cached.
    fn found_size(&mut self, size: Position) {
        if !self.growing {
            self.size = Some(size);
        }
    }

    fn probe_random_access(&mut self) -> bool {
        let end = match self.inner.seek(SeekFrom::End(0)) {
            Ok(end) => end,
            Err(_) => return false,
        };
        if self.inner.seek(SeekFrom::Start(self.pos)).is_err() {
            return false;
        }
        self.found_size(end);
        true
    }
}

impl<R: Read + Seek> Source for FileSource<R> {
    fn read(&mut self, min_length: usize, dest: &mut [u8]) -> Result<usize> {
        if let Some(size) = self.size {
            if !self.growing && self.pos >= size {
                return Ok(0);
            }
        }
        let mut total = 0;
        while total < min_length {
            match self.inner.read(&mut dest[total..]) {
                Ok(0) => {
                    if !self.growing {
                        self.found_size(self.pos);
                    }
                    break;
                }
                Ok(read) => {
                    total += read;
                    self.pos += read as Position;
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error.into()),
            }
        }
        Ok(total)
    }

    fn supports_random_access(&mut self) -> bool {
        match self.random_access.resolved() {
            Some(answer) => answer,
            None => {
                let supported = self.probe_random_access();
                self.random_access = if supported {
                    LazyBool::True
                } else {
                    LazyBool::False
                };
                supported
            }
        }
    }

    fn seek(&mut self, new_pos: Position) -> Result<Position> {
        if new_pos > self.pos {
            // Seeking forwards may pass the end: clamp against the size,
            // re-probed for growing sources.
            let size = match self.size {
                Some(size) if !self.growing => size,
                _ => {
                    let end = self.inner.seek(SeekFrom::End(0))?;
                    self.found_size(end);
                    end
                }
            };
            if new_pos > size {
                self.inner.seek(SeekFrom::Start(size))?;
                self.pos = size;
                return Ok(size);
            }
        }
        self.inner.seek(SeekFrom::Start(new_pos))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    fn size(&mut self) -> Result<Position> {
        if let Some(size) = self.size {
            if !self.growing {
                return Ok(size);
            }
        }
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.pos))?;
        self.found_size(end);
        Ok(end)
    }

    fn close(&mut self) -> Result<()> {
        // An unresolved probe is no longer interesting and must not touch
        // the handle later.
        self.random_access.collapse();
        Ok(())
    }
}

/// A [`Reader`](crate::Reader) over a seekable stream, typically a
/// [`File`].
///
/// Random access is supported if no assumed position was given and the
/// handle turns out to be seekable. With
/// [`ReaderOptions::with_growing_source`] a discovered size is treated as a
/// passing observation: reads past a previously seen end can find new bytes.
pub type FileReader<R> = BufferedReader<FileSource<R>>;

impl<R: Read + Seek> FileReader<R> {
    /// Create a reader over `inner` with default options.
    pub fn new(inner: R) -> Self {
        Self::with_options(inner, ReaderOptions::new())
    }

    /// Create a reader over `inner`.
    ///
    /// Without an assumed position the initial position is taken from the
    /// handle; if even that fails, 0 is assumed and random access is off.
    pub fn with_options(mut inner: R, options: ReaderOptions) -> Self {
        let (initial_pos, random_access) = match options.assumed_pos() {
            Some(pos) => (pos, LazyBool::False),
            None => match inner.stream_position() {
                Ok(pos) => (pos, LazyBool::Unknown),
                Err(_) => (0, LazyBool::False),
            },
        };
        let growing = options.growing_source();
        let source = FileSource {
            inner,
            pos: initial_pos,
            random_access,
            size: None,
            growing,
        };
        BufferedReader::from_source(source, options.with_assumed_pos(initial_pos))
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.source().inner
    }

    /// Consume the reader and return the stream. Buffered bytes are lost;
    /// call [`sync`](crate::Reader::sync) first to realign the handle with
    /// `pos()`.
    pub fn into_inner(self) -> R {
        self.into_source().inner
    }
}

impl FileReader<File> {
    /// Open the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path).map_err(OxiStreamError::from)?;
        Ok(Self::new(file))
    }
}
