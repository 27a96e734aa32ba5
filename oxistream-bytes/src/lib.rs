//! # OxiStream Bytes
//!
//! The byte-stream layer of OxiStream: buffered readers and writers with
//! caller-visible cursor windows.
//!
//! This crate provides:
//!
//! - [`Reader`]/[`Writer`]: the pull-model and push-model stream contracts
//! - [`BufferedReader`]/[`BufferedWriter`]: buffering templates over the
//!   [`Source`]/[`Sink`] backend seams
//! - [`PullableReader`]: scratch-buffer bridging over a
//!   [`FragmentedSource`]
//! - Leaf backends: [`SliceReader`], [`ChainReader`], [`StreamReader`],
//!   [`FileReader`], [`MmapReader`], [`VecWriter`], [`StreamWriter`],
//!   [`FileWriter`]
//! - [`WriterFile`]: a `std::io` file adapter over any [`Writer`]
//!
//! ## The window protocol
//!
//! Callers consume bytes straight out of a reader's window and produce
//! bytes straight into a writer's window; only when a window runs out does
//! control descend into the concrete backend:
//!
//! ```text
//! caller ──chunk()/advance()──▶ Reader window ──pull()──▶ Source::read
//! caller ──space()/advance()──▶ Writer window ──push()──▶ Sink::write
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxistream_bytes::{Reader, SliceReader, StreamWriter, Writer};
//!
//! let mut reader = SliceReader::new(b"payload".as_slice());
//! let mut writer = StreamWriter::new(Vec::new());
//! reader.copy_to(7, &mut writer).unwrap();
//! assert_eq!(writer.into_inner().unwrap(), b"payload");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffered_reader;
pub mod buffered_writer;
pub mod chain_reader;
pub mod file_reader;
pub mod file_writer;
pub mod mmap;
pub mod options;
pub mod pullable_reader;
pub mod reader;
pub mod slice_reader;
pub mod stream_reader;
pub mod stream_writer;
pub mod vec_writer;
pub mod writer;
pub mod writer_file;

// Re-exports for convenience
pub use buffered_reader::{BufferedReader, Source};
pub use buffered_writer::{BufferedWriter, Sink};
pub use chain_reader::ChainReader;
pub use file_reader::FileReader;
pub use file_writer::FileWriter;
pub use mmap::MmapReader;
pub use options::{ReaderOptions, WriterOptions};
pub use pullable_reader::{FragmentedSource, PullableReader};
pub use reader::Reader;
pub use slice_reader::SliceReader;
pub use stream_reader::StreamReader;
pub use stream_writer::StreamWriter;
pub use vec_writer::VecWriter;
pub use writer::Writer;
pub use writer_file::WriterFile;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::options::{ReaderOptions, WriterOptions};
    pub use crate::reader::Reader;
    pub use crate::writer::Writer;
    pub use oxistream_core::chain::Chain;
    pub use oxistream_core::flush::FlushMode;
    pub use oxistream_core::position::Position;
    pub use oxistream_core::status::{OxiStreamError, Result};
}
