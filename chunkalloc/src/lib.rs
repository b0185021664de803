//! Chunkalloc hands out owned, fixed-size memory blocks.
//!
//! It consists of two parts:
//! 1. [Block](block/trait.Block.html) implementations, one backed by the global heap and one
//!    backed by anonymous memory mappings.
//! 2. The [ChunkAllocator](block/trait.ChunkAllocator.html) trait, used by containers that grow
//!    and shrink in large chunks instead of per element.
//! ## Example
//! ```
//! use chunkalloc::block::*;
//!
//! fn main() {
//!     let allocator = HeapAllocator;
//!     let mut block = allocator.allocate(64).unwrap();
//!     block.as_mut_slice()[0] = 42;
//!     assert_eq!(block.as_slice()[0], 42);
//!     assert_eq!(block.len(), 64);
//!     allocator.release(block);
//! }
//! ```

pub mod block;
