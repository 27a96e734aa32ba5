//! Tuning options for readers and writers.

use oxistream_core::buffering::DEFAULT_BUFFER_SIZE;
use oxistream_core::position::Position;

/// Tuning options for buffered readers.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    buffer_size: usize,
    assumed_pos: Option<Position>,
    growing_source: bool,
}

impl ReaderOptions {
    /// Default options: 64 KiB buffer, no assumed position, fixed-size
    /// source.
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            assumed_pos: None,
            growing_source: false,
        }
    }

    /// Tune how much data is buffered after reading from the source.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size` is zero.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "zero buffer size");
        self.buffer_size = buffer_size;
        self
    }

    /// Assume this initial position instead of deriving one from the source.
    ///
    /// The position is reported by `pos()` and does not need to correspond
    /// to any real offset in the source. Setting it disables random access.
    pub fn with_assumed_pos(mut self, assumed_pos: Position) -> Self {
        self.assumed_pos = Some(assumed_pos);
        self
    }

    /// Declare that the source may keep growing while it is read.
    ///
    /// Disables caching of the end of the stream: a read past a previously
    /// discovered end may find new bytes.
    pub fn with_growing_source(mut self, growing_source: bool) -> Self {
        self.growing_source = growing_source;
        self
    }

    /// The configured buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The assumed initial position, if any.
    pub fn assumed_pos(&self) -> Option<Position> {
        self.assumed_pos
    }

    /// Whether the source is declared growing.
    pub fn growing_source(&self) -> bool {
        self.growing_source
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Tuning options for buffered writers.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    buffer_size: usize,
    size_hint: Option<Position>,
}

impl WriterOptions {
    /// Default options: 64 KiB buffer, no size hint.
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            size_hint: None,
        }
    }

    /// Tune how much data is buffered before writing to the sink.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size` is zero.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "zero buffer size");
        self.buffer_size = buffer_size;
        self
    }

    /// Declare the expected total size of the stream.
    ///
    /// Only a tuning input: buffers are sized to land exactly on the hint,
    /// keeping the number of sink writes minimal. Writing a different amount
    /// is not an error.
    pub fn with_size_hint(mut self, size_hint: Position) -> Self {
        self.size_hint = Some(size_hint);
        self
    }

    /// The configured buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The declared size hint, if any.
    pub fn size_hint(&self) -> Option<Position> {
        self.size_hint
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::new()
    }
}
