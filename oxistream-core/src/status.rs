//! Error types and sticky stream state for OxiStream operations.
//!
//! Every fallible stream operation returns a [`Result`]. End of stream is
//! never an error: readers report it through an `Ok(false)` from `pull` or a
//! short count from `read`. Once an operation fails, the owning stream object
//! records the error and every later operation short-circuits with a clone of
//! it until the object is closed.
//!
//! Errors carry a canonical [`StatusCode`]. OS-level errors enter the library
//! through exactly one place, the [`From<io::Error>`] conversion, which maps
//! the `io::ErrorKind` to the canonical taxonomy.

use std::io;
use thiserror::Error;

/// Canonical status codes for stream errors.
///
/// The taxonomy mirrors the usual canonical error space; OS errors are folded
/// into it through `From<io::Error>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Operation was cancelled.
    Cancelled,
    /// Unknown error.
    Unknown,
    /// A caller-supplied argument was invalid.
    InvalidArgument,
    /// A referenced entity was not found.
    NotFound,
    /// The caller lacks permission.
    PermissionDenied,
    /// A resource (memory, quota, disk) was exhausted.
    ResourceExhausted,
    /// The object was not in the state required by the operation.
    FailedPrecondition,
    /// The operation was aborted.
    Aborted,
    /// A position or size left the representable range.
    OutOfRange,
    /// The operation is not supported by this stream.
    Unimplemented,
    /// Internal invariant violation.
    Internal,
    /// The resource is temporarily unavailable.
    Unavailable,
    /// Unrecoverable data loss or corruption.
    DataLoss,
}

/// The main error type for OxiStream operations.
///
/// The type is `Clone` so that a failure can be stored in the stream object
/// and handed back from every later operation. I/O errors therefore keep the
/// `io::ErrorKind` and message rather than the `io::Error` itself.
#[derive(Debug, Clone, Error)]
pub enum OxiStreamError {
    /// I/O error from an underlying source or sink.
    #[error("I/O error: {message}")]
    Io {
        /// Kind of the originating `io::Error`.
        kind: io::ErrorKind,
        /// Message of the originating `io::Error`.
        message: String,
    },

    /// A caller-supplied argument was invalid.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// The operation is not supported by this stream.
    #[error("{operation} not supported")]
    Unsupported {
        /// The unsupported operation, e.g. `"Reader::seek"`.
        operation: String,
    },

    /// The object was not in the state required by the operation.
    #[error("failed precondition: {message}")]
    FailedPrecondition {
        /// Description of the violated precondition.
        message: String,
    },

    /// A position computation exceeded the representable range.
    #[error("position would overflow")]
    PositionOverflow,

    /// Unrecoverable data loss or corruption.
    #[error("data loss: {message}")]
    DataLoss {
        /// Description of the loss.
        message: String,
    },

    /// A resource (memory, quota, disk) was exhausted.
    #[error("resource exhausted: {message}")]
    ResourceExhausted {
        /// Description of the exhausted resource.
        message: String,
    },
}

/// Result type alias for OxiStream operations.
pub type Result<T> = std::result::Result<T, OxiStreamError>;

impl OxiStreamError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a failed precondition error.
    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::FailedPrecondition {
            message: message.into(),
        }
    }

    /// Create a position overflow error.
    pub fn position_overflow() -> Self {
        Self::PositionOverflow
    }

    /// Create a data loss error.
    pub fn data_loss(message: impl Into<String>) -> Self {
        Self::DataLoss {
            message: message.into(),
        }
    }

    /// The error raised by operations on a closed stream object.
    pub fn object_closed() -> Self {
        Self::failed_precondition("object closed")
    }

    /// The canonical status code of this error.
    pub fn code(&self) -> StatusCode {
        match self {
            Self::Io { kind, .. } => io_kind_code(*kind),
            Self::InvalidArgument { .. } => StatusCode::InvalidArgument,
            Self::Unsupported { .. } => StatusCode::Unimplemented,
            Self::FailedPrecondition { .. } => StatusCode::FailedPrecondition,
            Self::PositionOverflow => StatusCode::OutOfRange,
            Self::DataLoss { .. } => StatusCode::DataLoss,
            Self::ResourceExhausted { .. } => StatusCode::ResourceExhausted,
        }
    }
}

/// Map an `io::ErrorKind` (the OS-error normalisation) to a canonical code.
fn io_kind_code(kind: io::ErrorKind) -> StatusCode {
    match kind {
        io::ErrorKind::NotFound => StatusCode::NotFound,
        io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
        io::ErrorKind::AlreadyExists => StatusCode::FailedPrecondition,
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => StatusCode::InvalidArgument,
        io::ErrorKind::TimedOut => StatusCode::Unavailable,
        io::ErrorKind::Interrupted => StatusCode::Aborted,
        io::ErrorKind::Unsupported => StatusCode::Unimplemented,
        io::ErrorKind::UnexpectedEof | io::ErrorKind::WriteZero => StatusCode::DataLoss,
        io::ErrorKind::OutOfMemory => StatusCode::ResourceExhausted,
        io::ErrorKind::WouldBlock
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe => StatusCode::Unavailable,
        _ => StatusCode::Unknown,
    }
}

impl From<io::Error> for OxiStreamError {
    fn from(error: io::Error) -> Self {
        Self::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Sticky open/failed/closed state shared by every stream object.
///
/// Transitions are monotone: `open -> {failed, closed}`, `failed -> closed`.
/// The first recorded failure wins and stays observable after close.
#[derive(Debug, Clone)]
pub struct StreamState {
    open: bool,
    error: Option<OxiStreamError>,
}

impl StreamState {
    /// Create the state of a freshly opened object.
    pub fn new() -> Self {
        Self {
            open: true,
            error: None,
        }
    }

    /// Whether the object has not been closed.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the object is open and has not failed.
    #[inline]
    pub fn ok(&self) -> bool {
        self.open && self.error.is_none()
    }

    /// The recorded failure, if any. Survives close.
    #[inline]
    pub fn error(&self) -> Option<&OxiStreamError> {
        self.error.as_ref()
    }

    /// Record a failure. The first failure wins; the stored error is returned
    /// for propagation.
    pub fn fail(&mut self, error: OxiStreamError) -> OxiStreamError {
        self.error.get_or_insert(error).clone()
    }

    /// Fail unless the object is open and healthy.
    pub fn check_ok(&self) -> Result<()> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if !self.open {
            return Err(OxiStreamError::object_closed());
        }
        Ok(())
    }

    /// Transition to closed. Idempotent.
    pub fn mark_closed(&mut self) {
        self.open = false;
    }

    /// The result `close` reports: the sticky error if one was recorded.
    pub fn close_result(&self) -> Result<()> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new()
    }
}
