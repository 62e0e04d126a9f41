//! Error types for queue operations.

use thiserror::Error;

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A queue-context handle does not refer to any queue.
    #[error("queue handle does not refer to a queue")]
    NullHandle,

    /// The operation needs at least one element.
    #[error("queue is empty")]
    EmptyQueue,

    /// A node or payload allocation failed.
    #[error("memory allocation of {size} bytes failed")]
    AllocationFailure { size: usize },
}
