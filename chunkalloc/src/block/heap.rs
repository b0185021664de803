use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::io::{Error, ErrorKind};
use std::ptr::NonNull;

use super::{zero_sized, Block, ChunkAllocator};

const HEAP_ALIGN: usize = 16;

/// A block taken from the global allocator.
///
/// The memory is zeroed on allocation and aligned to 16 bytes, which covers every primitive
/// type on the supported platforms.
pub struct HeapBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

unsafe impl Send for HeapBlock {}

unsafe impl Block for HeapBlock {
    const ALIGN: usize = HEAP_ALIGN;

    fn new(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(zero_sized());
        }
        let layout = Layout::from_size_align(size, HEAP_ALIGN)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;
        let ptr = unsafe { alloc_zeroed(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self { ptr, layout }),
            None => Err(Error::new(
                ErrorKind::OutOfMemory,
                format!("Heap allocation of {} bytes failed", size),
            )),
        }
    }

    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn len(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

/// Allocates [HeapBlock](struct.HeapBlock.html)s from the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl ChunkAllocator for HeapAllocator {
    type Block = HeapBlock;

    fn allocate(&self, size: usize) -> Result<HeapBlock, Error> {
        HeapBlock::new(size)
    }
}
