mod heap;
mod mmap;
pub use heap::{HeapAllocator, HeapBlock};
pub use mmap::{MmapAllocator, MmapBlock};

use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// An owned, contiguous region of memory. The memory is returned to the system when the block
/// is dropped.
///
/// # Safety
///
/// Implementors must guarantee that `as_ptr()` points to `len()` bytes that are writable,
/// aligned to at least `ALIGN` and initialized when the block is created. Users that write
/// through `as_ptr()` instead of `as_mut_slice()` must only write initialized bytes, so that
/// the block can be handed to its next owner as readable memory.
pub unsafe trait Block: Sized + Send {
    /// Minimum alignment of the pointer returned by `as_ptr`.
    const ALIGN: usize;

    /// Returns a new block of `size` bytes.
    fn new(size: usize) -> Result<Self, Error>;

    /// Returns a pointer to the first byte of the block.
    fn as_ptr(&self) -> *mut u8;

    /// Returns the size of the block in bytes, as requested on creation.
    fn len(&self) -> usize;

    fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len()) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.as_ptr(), self.len()) }
    }
}

/// Source of blocks for chunked containers.
pub trait ChunkAllocator {
    type Block: Block;

    /// Returns a block of exactly `size` bytes.
    fn allocate(&self, size: usize) -> Result<Self::Block, Error>;

    /// Takes back a block that is no longer used.
    fn release(&self, block: Self::Block) {
        drop(block)
    }
}

impl<A: ChunkAllocator + ?Sized> ChunkAllocator for &A {
    type Block = A::Block;

    fn allocate(&self, size: usize) -> Result<Self::Block, Error> {
        (**self).allocate(size)
    }

    fn release(&self, block: Self::Block) {
        (**self).release(block)
    }
}

impl<A: ChunkAllocator + ?Sized> ChunkAllocator for Arc<A> {
    type Block = A::Block;

    fn allocate(&self, size: usize) -> Result<Self::Block, Error> {
        (**self).allocate(size)
    }

    fn release(&self, block: Self::Block) {
        (**self).release(block)
    }
}

pub(crate) fn zero_sized() -> Error {
    Error::new(ErrorKind::InvalidInput, "Can't allocate a block of 0 bytes")
}
