use std::io::Error;

use crossbeam::queue::ArrayQueue;

use crate::config::StackConfig;
use crate::error::Result;
use crate::{Block, ChunkAllocator, HeapBlock};

/// Keeps released blocks of one size around so that the next chunk allocation of that size
/// doesn't have to go to the system.
///
/// The pool is bounded, blocks released while it's full are dropped. A pool of capacity 0 keeps
/// nothing and allocates every block fresh. It can be shared between stacks (and threads)
/// through `&BlockPool` or `Arc<BlockPool>`, both are allocators too.
pub struct BlockPool<B: Block = HeapBlock> {
    pool: Option<ArrayQueue<B>>,
    block_size: usize,
}

impl<B: Block> BlockPool<B> {
    pub fn new(block_size: usize, capacity: usize) -> Self {
        Self {
            pool: if capacity == 0 {
                None
            } else {
                Some(ArrayQueue::new(capacity))
            },
            block_size,
        }
    }

    /// Returns a pool for chunks of stacks created with `config`.
    pub fn with_capacity_for(config: &StackConfig, capacity: usize) -> Result<Self> {
        Ok(Self::new(config.validate()?, capacity))
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of idle blocks in the pool.
    pub fn len(&self) -> usize {
        self.pool.as_ref().map_or(0, ArrayQueue::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.pool.as_ref().map_or(0, ArrayQueue::capacity)
    }
}

impl<B: Block> ChunkAllocator for BlockPool<B> {
    type Block = B;

    fn allocate(&self, size: usize) -> std::result::Result<B, Error> {
        if size != self.block_size {
            return B::new(size);
        }
        match self.pool.as_ref().and_then(ArrayQueue::pop) {
            None => B::new(size),
            Some(block) => Ok(block),
        }
    }

    fn release(&self, block: B) {
        if let Some(pool) = &self.pool {
            if block.len() == self.block_size {
                // If we push over the capacity just drop the block.
                let _ = pool.push(block);
            }
        }
    }
}
