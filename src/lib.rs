//! A LIFO stack of fixed-size elements that stores its elements in a linked list of large memory
//! chunks instead of allocating per element.
//!
//! Elements are opaque byte blocks of a size fixed when the stack is created. Pushes fill the top
//! chunk and link a fresh chunk on top once it's full, pops walk back down and release a chunk as
//! soon as its last element is gone. [TypedStack](typed/struct.TypedStack.html) puts a typed
//! front-end over the same storage.
//!
//! ## Example
//! ```
//! use chunk_stack::ChunkedStack;
//!
//! fn main() {
//!     // 4 byte elements, 2 elements per chunk.
//!     let mut stack = ChunkedStack::new(4, 8).unwrap();
//!     for i in 0u32..5 {
//!         stack.push(&i.to_ne_bytes()).unwrap();
//!     }
//!     assert_eq!(stack.count(), 5);
//!     assert_eq!(stack.chunk_count(), 3);
//!
//!     let mut top = [0u8; 4];
//!     stack.pop(Some(&mut top)).unwrap();
//!     assert_eq!(u32::from_ne_bytes(top), 4);
//!     assert_eq!(stack.chunk_count(), 2);
//! }
//! ```

pub mod config;
pub mod error;
pub mod pool;
pub mod typed;

pub use chunkalloc::block::{Block, ChunkAllocator, HeapAllocator, HeapBlock, MmapAllocator, MmapBlock};
pub use config::{StackConfig, DEFAULT_CHUNK_ELEMENTS, MAX_CHUNK_CAPACITY};
pub use error::{Result, StackError};
pub use pool::BlockPool;
pub use typed::TypedStack;

use std::borrow::Cow;
use std::fmt;
use std::io::{Error, ErrorKind};

use tracing::{debug, trace, warn};

// One link of the chunk list. `previous` points to the older chunk below.
struct Chunk<B> {
    payload: B,
    previous: Option<Box<Chunk<B>>>,
}

/// A stack of `element_size` byte elements stored in chunks of `chunk_capacity_bytes` bytes.
///
/// The top chunk holds the most recently pushed elements, `cursor` is the offset inside it where
/// the next push writes. Every chunk below the top is completely filled. A chunk is allocated by
/// the push that doesn't fit into the top chunk anymore and released by the pop that removes its
/// last element, so an empty stack holds no memory besides the handle.
///
/// Dropping the stack releases all chunks.
pub struct ChunkedStack<A: ChunkAllocator = HeapAllocator> {
    element_size: usize,
    chunk_capacity: usize,
    // Bytes of a completely filled chunk, the largest multiple of `element_size` that fits.
    chunk_span: usize,
    cursor: usize,
    len: usize,
    chunks: usize,
    top: Option<Box<Chunk<A::Block>>>,
    description: Cow<'static, str>,
    allocator: A,
}

impl ChunkedStack<HeapAllocator> {
    /// Returns an empty stack. A `chunk_capacity_bytes` of 0 selects room for
    /// `DEFAULT_CHUNK_ELEMENTS` elements per chunk.
    pub fn new(element_size: usize, chunk_capacity_bytes: usize) -> Result<Self> {
        Self::with_config(StackConfig::new(element_size).with_chunk_capacity(chunk_capacity_bytes))
    }

    /// Returns an empty stack with room for `DEFAULT_CHUNK_ELEMENTS` elements per chunk.
    pub fn with_default_capacity(element_size: usize) -> Result<Self> {
        Self::new(element_size, 0)
    }

    pub fn with_config(config: StackConfig) -> Result<Self> {
        Self::with_config_in(config, HeapAllocator)
    }
}

impl<A: ChunkAllocator> ChunkedStack<A> {
    /// Returns an empty stack that takes its chunks from `allocator`.
    pub fn with_config_in(config: StackConfig, allocator: A) -> Result<Self> {
        let chunk_capacity = config.validate()?;
        let element_size = config.element_size;
        let stack = Self {
            element_size,
            chunk_capacity,
            chunk_span: chunk_capacity / element_size * element_size,
            cursor: 0,
            len: 0,
            chunks: 0,
            top: None,
            description: config.description,
            allocator,
        };
        debug!(
            description = %stack.description,
            element_size,
            chunk_capacity_bytes = chunk_capacity,
            "created chunked stack"
        );
        Ok(stack)
    }

    /// Copies `src` into a new element on top of the stack.
    pub fn push(&mut self, src: &[u8]) -> Result<()> {
        if src.len() != self.element_size {
            return Err(StackError::invalid(format!(
                "pushed {} bytes onto a stack of {} byte elements",
                src.len(),
                self.element_size
            )));
        }
        self.push_uninitialized()?.copy_from_slice(src);
        Ok(())
    }

    /// Reserves a new element on top of the stack and returns its slot for the caller to fill.
    ///
    /// The slot's content is unspecified, it holds whatever bytes the chunk memory held before.
    pub fn push_uninitialized(&mut self) -> Result<&mut [u8]> {
        let element_size = self.element_size;
        let top_is_full = self.cursor + element_size > self.chunk_capacity;
        let top = match (self.top.take(), top_is_full) {
            (Some(top), false) => top,
            (previous, _) => match self.allocate_payload() {
                Ok(payload) => {
                    self.chunks += 1;
                    self.cursor = 0;
                    trace!(
                        description = %self.description,
                        chunk_count = self.chunks,
                        "allocated chunk"
                    );
                    Box::new(Chunk { payload, previous })
                }
                Err(e) => {
                    self.top = previous;
                    return Err(e);
                }
            },
        };
        let top = self.top.insert(top);
        let start = self.cursor;
        self.cursor += element_size;
        self.len += 1;
        Ok(&mut top.payload.as_mut_slice()[start..start + element_size])
    }

    /// Removes the top element, copying it into `dst` if one is given.
    pub fn pop(&mut self, dst: Option<&mut [u8]>) -> Result<()> {
        if let Some(dst) = &dst {
            self.check_destination(dst.len(), 1)?;
        }
        self.check_available(1)?;
        self.cursor -= self.element_size;
        self.len -= 1;
        if let (Some(dst), Some(top)) = (dst, self.top.as_deref()) {
            dst.copy_from_slice(&top.payload.as_slice()[self.cursor..self.cursor + self.element_size]);
        }
        if self.cursor == 0 {
            self.release_top();
        }
        Ok(())
    }

    /// Pops `n` elements into `dst` in pop order, the former top element lands at index 0.
    ///
    /// Nothing is popped if the stack holds fewer than `n` elements or `dst` isn't exactly `n`
    /// elements long.
    pub fn pop_n(&mut self, dst: &mut [u8], n: usize) -> Result<()> {
        self.check_destination(dst.len(), n)?;
        self.check_available(n)?;
        for slot in dst.chunks_exact_mut(self.element_size) {
            self.pop(Some(slot))?;
        }
        Ok(())
    }

    /// Pops `n` elements into `dst` in push order, the former top element lands at index `n - 1`.
    ///
    /// Same all-or-nothing rules as `pop_n`.
    pub fn pop_n_reverse(&mut self, dst: &mut [u8], n: usize) -> Result<()> {
        self.check_destination(dst.len(), n)?;
        self.check_available(n)?;
        for slot in dst.chunks_exact_mut(self.element_size).rev() {
            self.pop(Some(slot))?;
        }
        Ok(())
    }

    /// Returns the top element without removing it.
    pub fn peek(&self) -> Result<&[u8]> {
        self.check_available(1)?;
        let (start, end) = (self.cursor - self.element_size, self.cursor);
        self.top
            .as_deref()
            .map(|top| &top.payload.as_slice()[start..end])
            .ok_or_else(|| self.underflow(1))
    }

    /// Returns the top element for in-place modification.
    pub fn peek_mut(&mut self) -> Result<&mut [u8]> {
        self.check_available(1)?;
        let (start, end) = (self.cursor - self.element_size, self.cursor);
        let available = self.len;
        self.top
            .as_deref_mut()
            .map(|top| &mut top.payload.as_mut_slice()[start..end])
            .ok_or(StackError::Underflow {
                requested: 1,
                available,
            })
    }

    /// Removes the top element without reading it.
    pub fn discard(&mut self) -> Result<()> {
        self.pop(None)
    }

    /// Removes all elements and releases every chunk. The stack stays usable.
    pub fn clear(&mut self) {
        let released = self.chunks;
        while self.top.is_some() {
            self.release_top();
        }
        self.cursor = 0;
        self.len = 0;
        debug!(
            description = %self.description,
            released_chunks = released,
            "cleared chunked stack"
        );
    }

    /// Number of elements on the stack.
    pub fn count(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn chunk_capacity_bytes(&self) -> usize {
        self.chunk_capacity
    }

    pub fn elements_per_chunk(&self) -> usize {
        self.chunk_span / self.element_size
    }

    /// Number of chunks currently held by the stack.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    fn allocate_payload(&self) -> Result<A::Block> {
        let size = self.chunk_capacity;
        let payload = self.allocator.allocate(size).and_then(|payload| {
            if payload.len() < size {
                Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("allocator returned {} bytes instead of {}", payload.len(), size),
                ))
            } else {
                Ok(payload)
            }
        });
        payload.map_err(|source| {
            warn!(
                description = %self.description,
                size,
                error = %source,
                "chunk allocation failed"
            );
            StackError::OutOfMemory { size, source }
        })
    }

    // Unlinks the top chunk and hands it back to the allocator. The chunk below is full, so the
    // cursor moves to its end.
    fn release_top(&mut self) {
        if let Some(mut exhausted) = self.top.take() {
            self.top = exhausted.previous.take();
            self.chunks -= 1;
            self.cursor = if self.top.is_some() { self.chunk_span } else { 0 };
            self.allocator.release(exhausted.payload);
            trace!(
                description = %self.description,
                chunk_count = self.chunks,
                "released chunk"
            );
        }
    }

    fn check_available(&self, requested: usize) -> Result<()> {
        if requested > self.len {
            Err(self.underflow(requested))
        } else {
            Ok(())
        }
    }

    fn check_destination(&self, len: usize, n: usize) -> Result<()> {
        match n.checked_mul(self.element_size) {
            Some(expected) if expected == len => Ok(()),
            _ => Err(StackError::invalid(format!(
                "destination of {} bytes can't hold {} element(s) of {} bytes",
                len, n, self.element_size
            ))),
        }
    }

    fn underflow(&self, requested: usize) -> StackError {
        StackError::Underflow {
            requested,
            available: self.len,
        }
    }
}

impl<A: ChunkAllocator> Drop for ChunkedStack<A> {
    fn drop(&mut self) {
        // Release chunks one by one, dropping the list head would recurse through every link.
        while self.top.is_some() {
            self.release_top();
        }
    }
}

impl<A: ChunkAllocator> fmt::Debug for ChunkedStack<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedStack")
            .field("description", &self.description)
            .field("element_size", &self.element_size)
            .field("chunk_capacity_bytes", &self.chunk_capacity)
            .field("count", &self.len)
            .field("chunk_count", &self.chunks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_chunk_boundaries() {
        let mut stack = ChunkedStack::new(8, 16).unwrap();
        assert_eq!((stack.cursor, stack.chunks), (0, 0));
        stack.push(&[1; 8]).unwrap();
        stack.push(&[2; 8]).unwrap();
        assert_eq!((stack.cursor, stack.chunks), (16, 1));
        stack.push(&[3; 8]).unwrap();
        assert_eq!((stack.cursor, stack.chunks), (8, 2));
        stack.discard().unwrap();
        assert_eq!((stack.cursor, stack.chunks), (16, 1));
        stack.discard().unwrap();
        stack.discard().unwrap();
        assert_eq!((stack.cursor, stack.chunks), (0, 0));
        assert!(stack.top.is_none());
    }

    #[test]
    fn unused_tail_of_uneven_chunk() {
        // 20 byte chunks hold two 8 byte elements, the last 4 bytes stay unused.
        let mut stack = ChunkedStack::new(8, 20).unwrap();
        assert_eq!(stack.chunk_span, 16);
        for i in 0..3u8 {
            stack.push(&[i; 8]).unwrap();
        }
        assert_eq!((stack.cursor, stack.chunks), (8, 2));
        stack.discard().unwrap();
        assert_eq!((stack.cursor, stack.chunks), (16, 1));
        assert_eq!(stack.peek().unwrap(), &[1; 8]);
    }

    #[test]
    fn long_chains_drop_without_recursion() {
        let mut stack = ChunkedStack::new(1, 1).unwrap();
        for _ in 0..200_000 {
            stack.push(&[7]).unwrap();
        }
        assert_eq!(stack.chunk_count(), 200_000);
        drop(stack);
    }
}
