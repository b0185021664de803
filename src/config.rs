use std::borrow::Cow;

use crate::error::{Result, StackError};

/// Number of elements a chunk holds when no chunk capacity is given.
pub const DEFAULT_CHUNK_ELEMENTS: usize = 1024;

/// Largest chunk capacity in bytes. No allocation may exceed `isize::MAX` bytes.
pub const MAX_CHUNK_CAPACITY: usize = isize::MAX as usize;

const DEFAULT_DESCRIPTION: &str = "chunk-stack";

/// Construction parameters of a [ChunkedStack](../struct.ChunkedStack.html).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// Size of one element in bytes.
    pub element_size: usize,
    /// Bytes of element storage per chunk, `0` selects `DEFAULT_CHUNK_ELEMENTS` elements.
    pub chunk_capacity_bytes: usize,
    /// Label attached to the stack's log events.
    pub description: Cow<'static, str>,
}

impl StackConfig {
    pub fn new(element_size: usize) -> Self {
        Self {
            element_size,
            chunk_capacity_bytes: 0,
            description: Cow::Borrowed(DEFAULT_DESCRIPTION),
        }
    }

    pub fn with_chunk_capacity(mut self, bytes: usize) -> Self {
        self.chunk_capacity_bytes = bytes;
        self
    }

    /// Sizes chunks to hold exactly `elements` elements. Saturates instead of overflowing, the
    /// result is rejected by `validate` in that case.
    pub fn with_chunk_elements(mut self, elements: usize) -> Self {
        self.chunk_capacity_bytes = elements.saturating_mul(self.element_size);
        self
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks the parameters and returns the chunk capacity in bytes the stack will use.
    ///
    /// Capacities above `MAX_CHUNK_CAPACITY` are rejected here; capacities below it that the
    /// allocator can't serve fail on the first push with `OutOfMemory`.
    pub fn validate(&self) -> Result<usize> {
        if self.element_size == 0 {
            return Err(StackError::invalid("element size must be greater than 0"));
        }
        let bytes = match self.chunk_capacity_bytes {
            0 => self
                .element_size
                .checked_mul(DEFAULT_CHUNK_ELEMENTS)
                .unwrap_or(usize::MAX),
            bytes => bytes,
        };
        if bytes > MAX_CHUNK_CAPACITY {
            return Err(StackError::invalid(format!(
                "chunk capacity of {} bytes exceeds the maximum of {} bytes",
                bytes, MAX_CHUNK_CAPACITY
            )));
        }
        if bytes < self.element_size {
            return Err(StackError::invalid(format!(
                "chunk capacity of {} bytes can't hold one {} byte element",
                bytes, self.element_size
            )));
        }
        Ok(bytes)
    }
}
