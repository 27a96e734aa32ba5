//! A reader over a [`Chain`] of shared byte blocks.

use bytes::Bytes;
use oxistream_core::chain::Chain;
use oxistream_core::position::Position;
use oxistream_core::status::Result;

use crate::pullable_reader::{FragmentedSource, PullableReader};

/// The fragment seam over a [`Chain`]: one block at a time, in order.
#[derive(Debug)]
pub struct ChainFragments {
    chain: Chain,
    index: usize,
}

impl ChainFragments {
    fn new(chain: Chain) -> Self {
        Self { chain, index: 0 }
    }

    /// The chain being read from.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }
}

impl FragmentedSource for ChainFragments {
    fn fragment(&self) -> &[u8] {
        self.chain.blocks().get(self.index).map_or(&[], |b| b.as_ref())
    }

    fn next_fragment(&mut self) -> Result<bool> {
        if self.index >= self.chain.blocks().len() {
            return Ok(false);
        }
        self.index += 1;
        Ok(self.index < self.chain.blocks().len())
    }

    fn supports_random_access(&mut self) -> bool {
        true
    }

    fn seek_fragment(&mut self, new_pos: Position) -> Result<(Position, Position)> {
        let total = self.chain.len() as Position;
        let reached = new_pos.min(total);
        let mut block_start: Position = 0;
        for (index, block) in self.chain.blocks().iter().enumerate() {
            let block_end = block_start + block.len() as Position;
            if reached < block_end {
                self.index = index;
                return Ok((reached, block_end));
            }
            block_start = block_end;
        }
        // At or past the end: empty fragment at the total size.
        self.index = self.chain.blocks().len();
        Ok((reached, total))
    }

    fn size(&mut self) -> Result<Position> {
        Ok(self.chain.len() as Position)
    }

    fn shared_fragment(&self) -> Option<Bytes> {
        self.chain.blocks().get(self.index).cloned()
    }
}

/// A [`Reader`](crate::Reader) over a [`Chain`].
///
/// Blocks are served as fragments; contiguous views across block boundaries
/// come from the scratch buffer of [`PullableReader`]. Random access walks
/// the block list. `read_chain` hands out shared sub-blocks instead of
/// copying whenever a whole run inside one block is taken.
pub type ChainReader = PullableReader<ChainFragments>;

impl ChainReader {
    /// Create a reader over `chain`, positioned at its start.
    pub fn new(chain: Chain) -> Self {
        Self::from_source(ChainFragments::new(chain))
    }
}
