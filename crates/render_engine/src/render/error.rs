//! Error types for the rendering memory subsystems
//!
//! Everything here is a local, non-transient condition: either a programmer
//! error (stale or out-of-range reference, misused mapping session) or a
//! budget misconfiguration (capacity exhaustion). There are no retryable
//! faults, and nothing degrades gracefully; callers either plan capacity
//! ahead of time or abort with the diagnostic.

use thiserror::Error;

/// Errors produced by the memory subsystems
#[derive(Debug, Error)]
pub enum MemoryError {
    /// An allocation would exceed a fixed budget
    #[error("{resource} capacity exceeded: requested {requested} bytes, {remaining} remaining (frame {frame})")]
    CapacityExceeded {
        /// Which allocator ran out
        resource: &'static str,
        /// Bytes (or elements) requested
        requested: u64,
        /// Bytes (or elements) still available
        remaining: u64,
        /// Frame index at the time of the failure
        frame: u64,
    },

    /// A buffer reference does not fit inside its owner or the owner lacks
    /// the required usage capability
    #[error("Invalid buffer reference: {reason}")]
    InvalidReference {
        /// Why the reference was rejected
        reason: String,
    },

    /// A buffer reference resolved to an owner that no longer exists
    #[error("Buffer reference owner has been destroyed")]
    StaleBuffer,

    /// The mesh stream is in initial-load-only mode and has already flushed
    #[error("Mesh stream is sealed: initial-load-only streams flush exactly once")]
    StreamSealed,

    /// A ring buffer operation outside a map/unmap session
    #[error("Ring buffer is not mapped")]
    NotMapped,

    /// A second map call inside an open session
    #[error("Ring buffer is already mapped")]
    AlreadyMapped,

    /// An underlying device operation failed
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Result type for memory subsystem operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors produced by the device-resource collaborator
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The buffer handle does not name a live buffer
    #[error("Buffer not found (destroyed or never created)")]
    BufferNotFound,

    /// A write or map touched bytes outside the buffer
    #[error("Buffer access out of range: offset {offset} + {len} exceeds size {size}")]
    OutOfRange {
        /// Byte offset of the access
        offset: u64,
        /// Length of the access
        len: u64,
        /// Size of the buffer
        size: u64,
    },

    /// Mapping failed or the buffer is not host-visible
    #[error("Buffer map failed: {reason}")]
    MapFailed {
        /// Why the mapping was refused
        reason: String,
    },
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;
