//! # OxiStream Core
//!
//! Core components for the OxiStream byte-stream library.
//!
//! This crate provides the fundamental building blocks shared by every
//! reader and writer in the stream layer:
//!
//! - [`position`]: Stream positions and overflow-checked position math
//! - [`status`]: Error types, canonical status codes, sticky stream state
//! - [`buffer`]: Owning, resizable byte buffer with capacity reuse
//! - [`buffering`]: Buffer sizing policy (size hints, copy thresholds)
//! - [`chain`]: A rope of reference-counted byte blocks
//! - [`flush`]: Flush/sync depth selection
//! - [`lazy`]: Tri-state for lazily probed capabilities
//!
//! ## Architecture
//!
//! OxiStream is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Backends                                            │
//! │     SliceReader, StreamReader, FileReader, VecWriter,  │
//! │     StreamWriter, FileWriter, WriterFile adapter       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Buffering templates                                 │
//! │     BufferedReader, BufferedWriter, PullableReader     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Stream contracts                                    │
//! │     Reader/Writer traits, cursor windows               │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Base (this crate)                                   │
//! │     Position, Buffer, Chain, status, sizing policy     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxistream_core::buffer::Buffer;
//! use oxistream_core::chain::Chain;
//!
//! let buf = Buffer::with_capacity(4096);
//! assert!(buf.capacity() >= 4096);
//!
//! let mut chain = Chain::new();
//! chain.append_slice(b"hello");
//! assert_eq!(chain.to_vec(), b"hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod buffering;
pub mod chain;
pub mod flush;
pub mod lazy;
pub mod position;
pub mod status;

// Re-exports for convenience
pub use buffer::Buffer;
pub use buffering::{buffer_length, DEFAULT_BUFFER_SIZE, MAX_BYTES_TO_COPY};
pub use chain::Chain;
pub use flush::FlushMode;
pub use lazy::LazyBool;
pub use position::{Position, MAX_POSITION};
pub use status::{OxiStreamError, Result, StatusCode, StreamState};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::chain::Chain;
    pub use crate::flush::FlushMode;
    pub use crate::position::{Position, MAX_POSITION};
    pub use crate::status::{OxiStreamError, Result};
}
