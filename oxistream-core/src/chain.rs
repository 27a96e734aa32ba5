//! A rope of reference-counted byte blocks.
//!
//! [`Chain`] is the destination type for reads that want to avoid one large
//! contiguous copy: readers append either owned copies of small fragments or
//! shared references to large blocks they already hold. Appending a shared
//! block is O(1) and copies nothing.

use bytes::Bytes;

use crate::buffering::MAX_BYTES_TO_COPY;

/// A sequence of byte blocks behaving as one logical byte string.
///
/// Blocks are [`Bytes`], so appending a block another owner already holds
/// shares it instead of copying. Small appends are merged into the trailing
/// block to keep fragmentation bounded.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    blocks: Vec<Bytes>,
    len: usize,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain with one copied block.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut chain = Self::new();
        chain.append_slice(data);
        chain
    }

    /// Total number of bytes across all blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the chain holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying blocks, in order. Empty blocks never appear.
    #[inline]
    pub fn blocks(&self) -> &[Bytes] {
        &self.blocks
    }

    /// Append a shared block without copying. Empty blocks are ignored.
    pub fn push_block(&mut self, block: Bytes) {
        if block.is_empty() {
            return;
        }
        self.len += block.len();
        self.blocks.push(block);
    }

    /// Append a copy of `data`.
    ///
    /// Slices at or below the copy threshold are merged into the trailing
    /// block when that keeps the block small; larger slices become their own
    /// block.
    pub fn append_slice(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.len += data.len();
        if data.len() <= MAX_BYTES_TO_COPY {
            if let Some(last) = self.blocks.last_mut() {
                if last.len() + data.len() <= 2 * MAX_BYTES_TO_COPY {
                    let mut merged = Vec::with_capacity(last.len() + data.len());
                    merged.extend_from_slice(last);
                    merged.extend_from_slice(data);
                    *last = Bytes::from(merged);
                    return;
                }
            }
        }
        self.blocks.push(Bytes::copy_from_slice(data));
    }

    /// Append all blocks of another chain, sharing them.
    pub fn append_chain(&mut self, other: Chain) {
        for block in other.blocks {
            self.push_block(block);
        }
    }

    /// Collect the chain into one contiguous vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for block in &self.blocks {
            out.extend_from_slice(block);
        }
        out
    }

    /// Remove all blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }
}

impl From<Vec<u8>> for Chain {
    fn from(data: Vec<u8>) -> Self {
        let mut chain = Self::new();
        chain.push_block(Bytes::from(data));
        chain
    }
}

impl PartialEq<[u8]> for Chain {
    fn eq(&self, other: &[u8]) -> bool {
        self.len == other.len() && {
            let mut offset = 0;
            self.blocks.iter().all(|block| {
                let matches = other[offset..offset + block.len()] == block[..];
                offset += block.len();
                matches
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let chain = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.to_vec().is_empty());
    }

    #[test]
    fn test_push_block_shares() {
        let block = Bytes::from_static(b"0123456789");
        let mut chain = Chain::new();
        chain.push_block(block.clone());
        chain.push_block(Bytes::new()); // ignored
        assert_eq!(chain.blocks().len(), 1);
        assert_eq!(chain.to_vec(), b"0123456789");
    }

    #[test]
    fn test_small_appends_merge() {
        let mut chain = Chain::new();
        chain.append_slice(b"hello ");
        chain.append_slice(b"world");
        assert_eq!(chain.blocks().len(), 1);
        assert_eq!(chain.to_vec(), b"hello world");
    }

    #[test]
    fn test_large_append_gets_own_block() {
        let big = vec![0xAB; 4096];
        let mut chain = Chain::new();
        chain.append_slice(b"tiny");
        chain.append_slice(&big);
        assert_eq!(chain.blocks().len(), 2);
        assert_eq!(chain.len(), 4 + 4096);
    }

    #[test]
    fn test_append_chain() {
        let mut a = Chain::from_slice(b"ab");
        let mut b = Chain::new();
        b.push_block(Bytes::from_static(b"cdef"));
        a.append_chain(b);
        assert_eq!(a.to_vec(), b"abcdef");
    }

    #[test]
    fn test_eq_slice() {
        let mut chain = Chain::new();
        chain.append_slice(b"ab");
        chain.push_block(Bytes::from_static(b"cd"));
        assert!(chain == *b"abcd".as_slice());
        assert!(chain != *b"abce".as_slice());
    }
}
