//! A reader template over sources that serve fragmented windows.
//!
//! Some sources hold their data in discontiguous blocks (a rope of shared
//! byte blocks, for instance). They can cheaply expose one block at a time,
//! but a caller asking for `pull(min >= 2)` may need a contiguous view that
//! spans a block boundary. [`PullableReader`] bridges that gap with a private
//! *scratch* buffer: it drains successive fragments into the scratch until
//! enough contiguous bytes accumulate, then aliases the public window onto
//! the scratch. Once the caller consumes past the scratch, the window
//! seamlessly snaps back to the underlying fragment at the exact same
//! position — byte-for-byte, a scratch-bridged reader is indistinguishable
//! from a contiguous one.

use bytes::Bytes;
use oxistream_core::buffering::MAX_BYTES_TO_COPY;
use oxistream_core::chain::Chain;
use oxistream_core::flush::FlushMode;
use oxistream_core::position::Position;
use oxistream_core::status::{OxiStreamError, Result, StreamState};

use crate::reader::Reader;

/// The backend seam of [`PullableReader`].
///
/// A source exposes its data one non-empty fragment at a time. Advancing to
/// the next fragment is only requested once the current one is fully
/// consumed.
pub trait FragmentedSource {
    /// The current fragment. Empty only before the first fragment of an
    /// empty source or after the last one.
    fn fragment(&self) -> &[u8];

    /// Move past the exhausted current fragment. `Ok(true)` means
    /// `fragment()` is now the next non-empty fragment; `Ok(false)` means
    /// the data ended.
    fn next_fragment(&mut self) -> Result<bool>;

    /// Whether `seek_fragment` and `size` work.
    fn supports_random_access(&mut self) -> bool {
        false
    }

    /// Reposition to the fragment containing `new_pos` (clamped to the data
    /// end). Returns `(reached, fragment_end)`: the position actually
    /// reached and the stream position of the new current fragment's end.
    fn seek_fragment(&mut self, new_pos: Position) -> Result<(Position, Position)> {
        let _ = new_pos;
        Err(OxiStreamError::unsupported("Reader::seek"))
    }

    /// Total size of the data.
    fn size(&mut self) -> Result<Position> {
        Err(OxiStreamError::unsupported("Reader::size"))
    }

    /// A shared handle to the current fragment, for zero-copy appends.
    fn shared_fragment(&self) -> Option<Bytes> {
        None
    }

    /// Hint that this many bytes will be read soon.
    fn read_hint(&mut self, min_length: usize, recommended_length: usize) {
        let _ = (min_length, recommended_length);
    }
}

/// Scratch record: the private buffer plus the underlying window state saved
/// when the scratch was installed.
#[derive(Debug, Default)]
struct Scratch {
    buffer: Vec<u8>,
    /// Cursor into the underlying fragment at install time.
    original_cursor: usize,
    /// Stream position of the underlying fragment's end at install time.
    original_limit_pos: Position,
}

/// A [`Reader`] over a [`FragmentedSource`], bridging fragment boundaries
/// with a scratch buffer.
///
/// While the scratch is live, the public window points into the scratch
/// buffer and `limit_pos` reflects the scratch end; the saved cursor and
/// limit position reconstruct the underlying window exactly on restore.
#[derive(Debug)]
pub struct PullableReader<S: FragmentedSource> {
    src: S,
    cursor: usize,
    limit_pos: Position,
    scratch: Scratch,
    scratch_active: bool,
    state: StreamState,
}

impl<S: FragmentedSource> PullableReader<S> {
    /// Create a reader over `src`, windowed on its first fragment.
    pub fn from_source(src: S) -> Self {
        let limit_pos = src.fragment().len() as Position;
        Self {
            src,
            cursor: 0,
            limit_pos,
            scratch: Scratch::default(),
            scratch_active: false,
            state: StreamState::new(),
        }
    }

    /// The source being read from.
    pub fn source(&self) -> &S {
        &self.src
    }

    /// Consume the reader and return the source.
    pub fn into_source(self) -> S {
        self.src
    }

    #[inline]
    fn window(&self) -> &[u8] {
        if self.scratch_active {
            &self.scratch.buffer
        } else {
            self.src.fragment()
        }
    }

    /// Advance the underlying source past its exhausted current fragment.
    fn next_fragment(&mut self) -> Result<bool> {
        debug_assert!(!self.scratch_active);
        debug_assert_eq!(self.cursor, self.src.fragment().len());
        match self.src.next_fragment() {
            Ok(true) => {
                debug_assert!(!self.src.fragment().is_empty());
                let length = self.src.fragment().len();
                match self.limit_pos.checked_add(length as Position) {
                    Some(limit_pos) => {
                        self.limit_pos = limit_pos;
                        self.cursor = 0;
                        Ok(true)
                    }
                    None => Err(self.state.fail(OxiStreamError::position_overflow())),
                }
            }
            Ok(false) => {
                // Past the end the source exposes an empty fragment.
                debug_assert!(self.src.fragment().is_empty());
                self.cursor = 0;
                Ok(false)
            }
            Err(error) => Err(self.state.fail(error)),
        }
    }

    /// Restore the saved underlying window, discarding the scratch view.
    fn sync_scratch(&mut self) {
        debug_assert!(self.scratch_active);
        self.cursor = self.scratch.original_cursor;
        self.limit_pos = self.scratch.original_limit_pos;
        self.scratch.buffer.clear();
        self.scratch_active = false;
    }

    /// If the unread scratch remainder mirrors the bytes just before the
    /// saved underlying cursor, restore the underlying window rewound by
    /// that remainder — the position is unchanged. Returns whether the
    /// restore happened.
    fn scratch_ends(&mut self) -> bool {
        debug_assert!(self.scratch_active);
        let remaining = self.scratch.buffer.len() - self.cursor;
        if self.scratch.original_cursor >= remaining {
            self.sync_scratch();
            self.cursor -= remaining;
            true
        } else {
            false
        }
    }

    fn pull_one(&mut self) -> Result<bool> {
        if self.scratch_active {
            debug_assert_eq!(self.available(), 0);
            self.sync_scratch();
            if self.available() > 0 {
                return Ok(true);
            }
        }
        self.next_fragment()
    }

    /// Build a contiguous view of at least `min_length` bytes in the
    /// scratch, draining successive fragments.
    fn pull_scratch(&mut self, min_length: usize, recommended_length: usize) -> Result<bool> {
        if self.scratch_active && self.scratch_ends() && self.available() >= min_length {
            return Ok(true);
        }
        if self.available() == 0 {
            debug_assert!(!self.scratch_active);
            if !self.next_fragment()? {
                return Ok(false);
            }
            if self.available() >= min_length {
                return Ok(true);
            }
        }
        let recommended = recommended_length.max(min_length);
        let max_total = recommended.saturating_add(recommended);
        let mut scratch_buf = std::mem::take(&mut self.scratch.buffer);
        if self.scratch_active {
            // The unread scratch tail seeds the new scratch; the underlying
            // window is restored behind it.
            scratch_buf.drain(..self.cursor);
            self.cursor = self.scratch.original_cursor;
            self.limit_pos = self.scratch.original_limit_pos;
            self.scratch_active = false;
        } else {
            scratch_buf.clear();
        }
        let mut result: Result<()> = Ok(());
        loop {
            let avail = self.src.fragment().len() - self.cursor;
            let take = avail.min(max_total - scratch_buf.len());
            if take > 0 {
                let start = self.cursor;
                scratch_buf.extend_from_slice(&self.src.fragment()[start..start + take]);
                self.cursor += take;
            }
            if scratch_buf.len() >= min_length {
                break;
            }
            match self.next_fragment() {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
        // Alias the window onto the scratch; limit_pos now names the scratch
        // end, which is exactly where the underlying cursor stands.
        self.scratch.original_cursor = self.cursor;
        self.scratch.original_limit_pos = self.limit_pos;
        let behind = (self.src.fragment().len() - self.cursor) as Position;
        self.limit_pos -= behind;
        self.scratch.buffer = scratch_buf;
        self.cursor = 0;
        self.scratch_active = true;
        result?;
        Ok(self.available() >= min_length)
    }

    #[inline]
    fn set_cursor_at(&mut self, pos: Position) {
        debug_assert!(pos >= self.start_pos() && pos <= self.limit_pos);
        let behind_limit = (self.limit_pos - pos) as usize;
        self.cursor = self.window().len() - behind_limit;
    }
}

impl<S: FragmentedSource> Reader for PullableReader<S> {
    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn error(&self) -> Option<&OxiStreamError> {
        self.state.error()
    }

    fn fail(&mut self, error: OxiStreamError) -> OxiStreamError {
        self.state.fail(error)
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.is_open() {
            return self.state.close_result();
        }
        if self.scratch_active && !self.scratch_ends() {
            if self.src.supports_random_access() {
                // Realign the source with the caller-visible position.
                let new_pos = self.pos();
                self.sync_scratch();
                let _ = self.seek(new_pos);
            }
            // Otherwise the unread scratch is discarded; the source stays
            // ahead, which no longer matters.
        }
        let final_pos = self.pos();
        self.limit_pos = final_pos;
        self.cursor = 0;
        self.scratch_active = false;
        self.scratch.buffer = Vec::new();
        self.state.mark_closed();
        self.state.close_result()
    }

    fn chunk(&self) -> &[u8] {
        if !self.state.is_open() {
            return &[];
        }
        &self.window()[self.cursor..]
    }

    fn start_to_cursor(&self) -> usize {
        if self.state.is_open() {
            self.cursor
        } else {
            0
        }
    }

    fn limit_pos(&self) -> Position {
        self.limit_pos
    }

    fn advance(&mut self, length: usize) {
        assert!(
            length <= self.available(),
            "advance past the window limit: {} > {}",
            length,
            self.available()
        );
        self.cursor += length;
    }

    fn pull(&mut self, min_length: usize, recommended_length: usize) -> Result<bool> {
        if self.available() >= min_length {
            return Ok(true);
        }
        self.state.check_ok()?;
        if min_length <= 1 {
            self.pull_one()
        } else {
            self.pull_scratch(min_length, recommended_length)
        }
    }

    fn read_chain(&mut self, length: usize, dest: &mut Chain) -> Result<usize> {
        let mut copied = 0;
        while copied < length {
            if self.available() == 0 && !self.pull(1, length - copied)? {
                break;
            }
            let take = self.available().min(length - copied);
            if !self.scratch_active && take > MAX_BYTES_TO_COPY {
                if let Some(block) = self.src.shared_fragment() {
                    let start = self.cursor;
                    dest.push_block(block.slice(start..start + take));
                    self.advance(take);
                    copied += take;
                    continue;
                }
            }
            dest.append_slice(&self.chunk()[..take]);
            self.advance(take);
            copied += take;
        }
        Ok(copied)
    }

    fn seek(&mut self, new_pos: Position) -> Result<bool> {
        if new_pos >= self.start_pos() && new_pos <= self.limit_pos {
            self.set_cursor_at(new_pos);
            return Ok(true);
        }
        self.state.check_ok()?;
        if self.scratch_active {
            self.sync_scratch();
            if new_pos >= self.start_pos() && new_pos <= self.limit_pos {
                self.set_cursor_at(new_pos);
                return Ok(true);
            }
        }
        if self.src.supports_random_access() {
            match self.src.seek_fragment(new_pos) {
                Ok((reached, fragment_end)) => {
                    self.limit_pos = fragment_end;
                    self.cursor = self.src.fragment().len() - (fragment_end - reached) as usize;
                    Ok(reached == new_pos)
                }
                Err(error) => Err(self.state.fail(error)),
            }
        } else if new_pos > self.limit_pos {
            // Forward: discard fragment by fragment.
            loop {
                self.cursor = self.src.fragment().len();
                if !self.next_fragment()? {
                    return Ok(false);
                }
                if new_pos <= self.limit_pos {
                    self.set_cursor_at(new_pos);
                    return Ok(true);
                }
            }
        } else {
            Err(self
                .state
                .fail(OxiStreamError::unsupported("Reader::seek backwards")))
        }
    }

    fn size(&mut self) -> Result<Position> {
        if !self.src.supports_random_access() {
            return Err(self.state.fail(OxiStreamError::unsupported("Reader::size")));
        }
        self.state.check_ok()?;
        match self.src.size() {
            Ok(size) => Ok(size),
            Err(error) => Err(self.state.fail(error)),
        }
    }

    fn sync(&mut self, _mode: FlushMode) -> Result<()> {
        self.state.check_ok()?;
        if self.scratch_active && !self.scratch_ends() {
            if !self.src.supports_random_access() {
                // The source cannot be rewound to the caller's position;
                // keep serving from the scratch so no bytes are lost.
                return Ok(());
            }
            let new_pos = self.pos();
            self.sync_scratch();
            self.seek(new_pos)?;
        }
        Ok(())
    }

    fn read_hint(&mut self, min_length: usize, recommended_length: usize) {
        let visible = self.available();
        if visible >= min_length {
            return;
        }
        // The hint describes bytes beyond what the window already covers, so
        // it reaches the source unclipped by the scratch.
        let min = min_length - visible;
        let recommended = recommended_length.saturating_sub(visible).max(min);
        self.src.read_hint(min, recommended);
    }

    fn supports_random_access(&mut self) -> bool {
        self.src.supports_random_access()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A source serving a fixed script of fragments.
    struct ScriptedFragments {
        fragments: Vec<Vec<u8>>,
        index: usize,
        pulls: usize,
    }

    impl ScriptedFragments {
        fn new(fragments: &[&[u8]]) -> Self {
            Self {
                fragments: fragments.iter().map(|f| f.to_vec()).collect(),
                index: 0,
                pulls: 0,
            }
        }
    }

    impl FragmentedSource for ScriptedFragments {
        fn fragment(&self) -> &[u8] {
            self.fragments.get(self.index).map_or(&[], Vec::as_slice)
        }

        fn next_fragment(&mut self) -> Result<bool> {
            self.pulls += 1;
            if self.index >= self.fragments.len() {
                return Ok(false);
            }
            self.index += 1;
            Ok(self.index < self.fragments.len())
        }
    }

    fn reader(fragments: &[&[u8]]) -> PullableReader<ScriptedFragments> {
        PullableReader::from_source(ScriptedFragments::new(fragments))
    }

    #[test]
    fn test_scratch_bridges_fragment_boundaries() {
        let mut r = reader(&[b"ab", b"cd", b"ef"]);
        assert!(r.pull(5, 5).unwrap());
        assert!(r.available() >= 5);
        assert_eq!(&r.chunk()[..5], b"abcde");
        r.advance(3);
        assert!(r.pull(3, 3).unwrap());
        assert_eq!(&r.chunk()[..3], b"def");
        r.advance(3);
        assert!(!r.pull(1, 1).unwrap());
        assert!(r.ok());
    }

    #[test]
    fn test_single_byte_pulls_never_touch_scratch() {
        let mut r = reader(&[b"ab", b"cd"]);
        let mut seen = Vec::new();
        while r.pull(1, 1).unwrap() {
            seen.push(r.chunk()[0]);
            r.advance(1);
        }
        assert_eq!(seen, b"abcd");
        assert!(!r.scratch_active);
    }

    #[test]
    fn test_scratch_is_invisible() {
        // The same bytes come out regardless of the pull granularity.
        for k in 1..=7 {
            let mut r = reader(&[b"ab", b"cd", b"ef", b"g"]);
            let mut seen = Vec::new();
            loop {
                let have = r.available();
                if have == 0 && !r.pull(k, k).unwrap() && r.available() == 0 {
                    break;
                }
                let take = r.available().min(k);
                seen.extend_from_slice(&r.chunk()[..take]);
                r.advance(take);
            }
            assert_eq!(seen, b"abcdefg", "pull granularity {k}");
            assert_eq!(r.pos(), 7);
        }
    }

    #[test]
    fn test_scratch_ends_rewinds_into_fragment() {
        let mut r = reader(&[b"abcd", b"efgh", b"ijkl"]);
        r.advance(2);
        // Scratch spans "cd" + "efgh".
        assert!(r.pull(3, 3).unwrap());
        assert_eq!(r.pos(), 2);
        assert!(r.scratch_active);
        r.advance(4); // consume "cdef"
        // The remainder "gh" mirrors the tail of the underlying fragment:
        // the next multi-byte pull restores that fragment rewound by the
        // remainder and continues from there, position unchanged.
        assert!(r.pull(4, 4).unwrap());
        assert_eq!(r.pos(), 6);
        assert_eq!(&r.chunk()[..4], b"ghij");
    }

    #[test]
    fn test_pull_more_while_scratch_live() {
        let mut r = reader(&[b"ab", b"cd", b"ef", b"gh"]);
        assert!(r.pull(3, 3).unwrap());
        r.advance(1);
        // Still inside scratch; asking for more re-seeds from the unread
        // tail.
        assert!(r.pull(6, 6).unwrap());
        assert_eq!(&r.chunk()[..6], b"bcdefg");
        assert_eq!(r.pos(), 1);
    }

    #[test]
    fn test_eof_with_partial_scratch() {
        let mut r = reader(&[b"ab", b"cd"]);
        assert!(!r.pull(10, 10).unwrap());
        // Whatever the stream had is visible.
        assert_eq!(r.chunk(), b"abcd");
        assert!(r.ok());
    }

    #[test]
    fn test_forward_seek_without_random_access() {
        let mut r = reader(&[b"ab", b"cd", b"ef"]);
        assert!(r.seek(3).unwrap());
        assert_eq!(r.pos(), 3);
        assert_eq!(r.chunk(), b"d");
        assert!(!r.seek(100).unwrap());
        assert_eq!(r.pos(), 6);
        assert!(r.ok());
    }

    #[test]
    fn test_seek_within_scratch_window() {
        let mut r = reader(&[b"ab", b"cd"]);
        assert!(r.pull(4, 4).unwrap());
        r.advance(3);
        assert!(r.seek(1).unwrap());
        assert_eq!(r.pos(), 1);
        assert_eq!(&r.chunk()[..3], b"bcd");
    }

    #[test]
    fn test_sync_without_random_access_keeps_scratch() {
        let mut r = reader(&[b"ab", b"cd", b"ef"]);
        assert!(r.pull(5, 5).unwrap());
        r.advance(1);
        r.sync(FlushMode::FromObject).unwrap();
        // The scratch view survives: no bytes are lost and the position is
        // unchanged.
        assert_eq!(r.pos(), 1);
        let mut rest = Vec::new();
        while r.pull(1, 1).unwrap() {
            rest.push(r.chunk()[0]);
            r.advance(1);
        }
        assert_eq!(rest, b"bcdef");
    }

    #[test]
    fn test_close_with_live_scratch() {
        let mut r = reader(&[b"ab", b"cd", b"ef"]);
        assert!(r.pull(5, 5).unwrap());
        r.advance(1);
        r.close().unwrap();
        assert_eq!(r.pos(), 1);
        assert_eq!(r.available(), 0);
        r.close().unwrap();
    }

    #[test]
    fn test_read_through_default_loop() {
        let mut r = reader(&[b"hello ", b"wor", b"ld"]);
        let mut dest = [0u8; 11];
        assert_eq!(r.read(&mut dest).unwrap(), 11);
        assert_eq!(&dest, b"hello world");
        assert_eq!(r.read(&mut dest).unwrap(), 0);
    }
}
