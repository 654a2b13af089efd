//! Buffer error types.

use thiserror::Error;

use crate::allocator::Range;
use crate::format::Format;

/// Errors that can occur in the buffer layer.
///
/// Every operation either fully succeeds or fails with one of these and leaves
/// the touched layout or allocator unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The value type cannot be converted to or from the element's format.
    #[error("cannot convert {value} to or from format {format:?}")]
    UnsupportedConversion {
        /// Format of the element.
        format: Format,
        /// Name of the requested value type.
        value: &'static str,
    },
    /// The format has no per-item byte size and cannot back an attribute.
    #[error("format {0:?} cannot be used as an attribute format")]
    UnsupportedFormat(Format),
    /// The declared stride is smaller than one tightly packed item.
    #[error("stride {stride} is too small for format {format:?} (needs at least {required})")]
    InvalidStride {
        /// Format of the element.
        format: Format,
        /// Declared byte stride.
        stride: usize,
        /// Tight item byte size of the format.
        required: usize,
    },
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// No element exists at the given index.
    #[error("no attribute element at index {0}")]
    ElementNotFound(usize),
    /// An item index outside of the view was accessed.
    #[error("index {index} out of bounds for {len} items")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of addressable items.
        len: usize,
    },
    /// Growth cannot satisfy the request.
    #[error("cannot allocate {requested} items (capacity {capacity}, limit {limit})")]
    AllocationExhausted {
        /// Number of items requested.
        requested: usize,
        /// Capacity at the time of the request.
        capacity: usize,
        /// Maximum capacity the allocator may grow to.
        limit: usize,
    },
    /// The range is not a live allocation of this allocator.
    #[error("range {0:?} is not a live allocation")]
    InvalidRange(Range),
    /// The mesh handle does not refer to a live allocation.
    #[error("invalid or stale mesh handle")]
    InvalidHandle,
    /// The element storage is shared with a clone that currently holds a
    /// conflicting view.
    #[error("attribute storage is borrowed by another view")]
    StorageBorrowed,
}

/// Convenience alias for results in the buffer layer.
pub type BufferResult<T> = Result<T, BufferError>;
