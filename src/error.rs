use std::io;

use thiserror::Error;

/// Errors returned by chunked stack operations.
///
/// Every operation that returns an error leaves the stack exactly as it was.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Chunk allocation of {size} bytes failed")]
    OutOfMemory {
        size: usize,
        #[source]
        source: io::Error,
    },

    #[error("Stack underflow: {requested} element(s) requested, {available} available")]
    Underflow { requested: usize, available: usize },
}

impl StackError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Stable category name of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "STACK:INVALID_ARGUMENT",
            Self::OutOfMemory { .. } => "STACK:OUT_OF_MEMORY",
            Self::Underflow { .. } => "STACK:UNDERFLOW",
        }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
