//! Memory-mapped file reading.
//!
//! A memory map is a stable in-memory byte container, so the mapped file is
//! served by [`SliceReader`] with full random access and zero copies. The
//! map is shared through an [`Arc`], making clones of the container cheap;
//! each reader keeps its own cursor.
//!
//! # Safety
//!
//! A mapped file must not be modified by another process while mapped; the
//! mapping here is read-only to minimise risks.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use oxistream_core::status::{OxiStreamError, Result};

use crate::slice_reader::SliceReader;

/// A shared read-only memory map usable as a reader source.
#[derive(Debug, Clone)]
pub struct SharedMmap(Arc<Mmap>);

impl AsRef<[u8]> for SharedMmap {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A [`Reader`](crate::Reader) over a memory-mapped file.
pub type MmapReader = SliceReader<SharedMmap>;

impl MmapReader {
    /// Map the file at `path` and create a reader over its contents.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path).map_err(OxiStreamError::from)?;
        // SAFETY: the mapping is read-only; the documented contract forbids
        // concurrent modification of the underlying file.
        let mmap = unsafe { Mmap::map(&file) }.map_err(OxiStreamError::from)?;
        Ok(SliceReader::new(SharedMmap(Arc::new(mmap))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use std::io::Write;

    #[test]
    fn test_mapped_file_reads_like_a_slice() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"mapped contents").unwrap();
        tmp.flush().unwrap();

        let mut reader = MmapReader::open(tmp.path()).unwrap();
        assert!(reader.supports_random_access());
        assert_eq!(reader.size().unwrap(), 15);
        let mut dest = [0u8; 6];
        assert!(reader.seek(7).unwrap());
        reader.read(&mut dest).unwrap();
        assert_eq!(&dest, b"conten");
    }
}
