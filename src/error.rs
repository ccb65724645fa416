//! Error types for atomstore
//!
//! Provides a unified error type for all operations. Rejected writes and
//! empty slots are NOT errors: they surface as `Ok(false)` and `Ok(None)`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using AtomError
pub type Result<T> = std::result::Result<T, AtomError>;

/// Unified error type for atomstore operations
#[derive(Debug, Error)]
pub enum AtomError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("Storage init failed for '{}': {reason}", path.display())]
    StorageInit { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("Index {index} out of range (capacity={capacity})")]
    IndexOutOfRange { index: i64, capacity: u64 },

    #[error("Engine is closed")]
    EngineClosed,

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AtomError {
    /// Build a `StorageInit` error for `path`
    pub(crate) fn storage_init(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AtomError::StorageInit {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
