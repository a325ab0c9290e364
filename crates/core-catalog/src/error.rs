//! Error types for catalog operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while updating, loading, or validating a catalog
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying inventory error
    #[error(transparent)]
    Inventory(#[from] relic_core_inventory::Error),

    /// Catalog file does not exist
    #[error("Catalog not found: {path}")]
    NotFound { path: PathBuf },

    /// Operation given an inventory for a different object
    #[error("Object id mismatch: catalog is for '{expected}', inventory is for '{found}'")]
    ObjectMismatch { expected: String, found: String },

    /// Storage root does not belong to the catalog's object
    #[error("Storage root {root} does not correspond to object '{object_id}'")]
    StorageRootMismatch { root: PathBuf, object_id: String },

    /// Two entries in one group carry equal signatures
    #[error("Duplicate signature in group '{group_id}' (storage path '{storage_path}')")]
    DuplicateSignature {
        group_id: String,
        storage_path: String,
    },

    /// Document violates a catalog invariant
    #[error("Malformed catalog: {message}")]
    MalformedCatalog { message: String },
}

impl Error {
    /// Create a not-found error
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create a malformed-catalog error with a message
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Error::MalformedCatalog {
            message: message.into(),
        }
    }
}
