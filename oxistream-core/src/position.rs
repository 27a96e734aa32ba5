//! Stream positions and overflow-checked position math.
//!
//! A [`Position`] is an unsigned 64-bit byte offset from the logical origin
//! of a stream. Positions saturate at [`MAX_POSITION`]; operations that would
//! exceed it report an overflow error instead of wrapping.

/// A byte offset from the logical origin of a stream.
pub type Position = u64;

/// The largest representable stream position.
///
/// No operation may move a stream past this position; attempts to do so fail
/// with [`OxiStreamError::PositionOverflow`](crate::status::OxiStreamError).
pub const MAX_POSITION: Position = u64::MAX;

/// Advance `pos` by `len` bytes, or `None` if the result would exceed
/// [`MAX_POSITION`].
#[inline]
pub fn checked_advance(pos: Position, len: usize) -> Option<Position> {
    pos.checked_add(len as Position)
}

/// The number of positions remaining between `pos` and [`MAX_POSITION`].
#[inline]
pub fn remaining_budget(pos: Position) -> Position {
    MAX_POSITION - pos
}
