use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::{Pod, PodCastError};

use crate::config::StackConfig;
use crate::error::{Result, StackError};
use crate::{Block, ChunkAllocator, ChunkedStack, HeapAllocator};

/// A [ChunkedStack](../struct.ChunkedStack.html) of `T` values.
///
/// Each element occupies `size_of::<T>()` bytes. Chunk memory is aligned to the allocator's block
/// alignment and every slot starts at a multiple of `size_of::<T>()`, so slots are always
/// properly aligned for `T`.
///
/// Values are stored as their raw bytes, so `T` must be `Pod`: no padding, any bit pattern valid.
/// Types with padding don't compile:
///
/// ```compile_fail
/// use chunk_stack::TypedStack;
///
/// let stack = TypedStack::<(u8, u32)>::new();
/// ```
pub struct TypedStack<T: Pod, A: ChunkAllocator = HeapAllocator> {
    inner: ChunkedStack<A>,
    marker: PhantomData<T>,
}

impl<T: Pod> TypedStack<T, HeapAllocator> {
    pub fn new() -> Result<Self> {
        Self::with_config_in(StackConfig::new(size_of::<T>()), HeapAllocator)
    }

    /// Returns an empty stack whose chunks hold `elements` values each.
    pub fn with_chunk_elements(elements: usize) -> Result<Self> {
        let config = StackConfig::new(size_of::<T>()).with_chunk_elements(elements);
        Self::with_config_in(config, HeapAllocator)
    }
}

impl<T: Pod, A: ChunkAllocator> TypedStack<T, A> {
    /// Returns an empty stack that takes its chunks from `allocator`. The element size of
    /// `config` must be `size_of::<T>()`.
    pub fn with_config_in(config: StackConfig, allocator: A) -> Result<Self> {
        if size_of::<T>() == 0 {
            return Err(StackError::invalid("zero sized types can't be stored"));
        }
        if config.element_size != size_of::<T>() {
            return Err(StackError::invalid(format!(
                "element size {} doesn't match the {} byte element type",
                config.element_size,
                size_of::<T>()
            )));
        }
        if align_of::<T>() > <A::Block as Block>::ALIGN {
            return Err(StackError::invalid(format!(
                "alignment {} exceeds the {} byte alignment of the allocator's blocks",
                align_of::<T>(),
                <A::Block as Block>::ALIGN
            )));
        }
        Ok(Self {
            inner: ChunkedStack::with_config_in(config, allocator)?,
            marker: PhantomData,
        })
    }

    pub fn push(&mut self, value: T) -> Result<()> {
        self.inner
            .push_uninitialized()?
            .copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T> {
        let value = *self.peek()?;
        self.inner.discard()?;
        Ok(value)
    }

    pub fn peek(&self) -> Result<&T> {
        bytemuck::try_from_bytes(self.inner.peek()?).map_err(misplaced_slot)
    }

    pub fn peek_mut(&mut self) -> Result<&mut T> {
        bytemuck::try_from_bytes_mut(self.inner.peek_mut()?).map_err(misplaced_slot)
    }

    pub fn discard(&mut self) -> Result<()> {
        self.inner.discard()
    }

    /// Pops `n` values, the former top value first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<T>> {
        self.check_available(n)?;
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            values.push(self.pop()?);
        }
        Ok(values)
    }

    /// Pops `n` values and returns them in the order they were pushed.
    pub fn pop_n_reverse(&mut self, n: usize) -> Result<Vec<T>> {
        let mut values = self.pop_n(n)?;
        values.reverse();
        Ok(values)
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn len(&self) -> usize {
        self.inner.count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The untyped stack holding the values.
    pub fn as_bytes(&self) -> &ChunkedStack<A> {
        &self.inner
    }

    fn check_available(&self, requested: usize) -> Result<()> {
        if requested > self.len() {
            Err(StackError::Underflow {
                requested,
                available: self.len(),
            })
        } else {
            Ok(())
        }
    }
}

// Alignment and size are checked when the stack is created, a failing cast means the allocator
// broke its `Block` alignment promise.
fn misplaced_slot(e: PodCastError) -> StackError {
    StackError::invalid(format!("slot can't be viewed as the element type: {:?}", e))
}

impl<T: Pod, A: ChunkAllocator> std::fmt::Debug for TypedStack<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedStack")
            .field("element_type", &std::any::type_name::<T>())
            .field("inner", &self.inner)
            .finish()
    }
}
