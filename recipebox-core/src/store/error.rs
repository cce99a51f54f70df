//! Store error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the document store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A collection or document path was malformed.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A query was rejected before execution.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// An update targeted a document that does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A set operation targeted a field holding a non-array value.
    #[error("Field '{field}' of {path} is not an array")]
    NotAnArray { path: String, field: String },

    /// The underlying Automerge document rejected an operation.
    #[error("Automerge error: {0}")]
    Automerge(String),

    /// Reading or writing the persisted store failed.
    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    /// The store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<automerge::AutomergeError> for StoreError {
    fn from(e: automerge::AutomergeError) -> Self {
        StoreError::Automerge(e.to_string())
    }
}

impl From<crate::persist::StorageError> for StoreError {
    fn from(e: crate::persist::StorageError) -> Self {
        match e {
            crate::persist::StorageError::Io { path, source } => StoreError::Io(path, source),
            crate::persist::StorageError::Corrupt { path, reason } => {
                StoreError::Unavailable(format!("{}: {}", path.display(), reason))
            }
        }
    }
}
