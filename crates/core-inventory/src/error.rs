//! Error types for inventory operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading, or validating inventories
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File or directory does not exist
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// Document violates a data-model invariant
    #[error("Malformed inventory: {message}")]
    MalformedInventory { message: String },

    /// Unrecognized checksum algorithm name
    #[error("Unknown checksum algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A signature needs at least one digest algorithm enabled
    #[error("At least one checksum algorithm must be enabled")]
    EmptyAlgorithmSet,
}

impl Error {
    /// Create a not-found error
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create a malformed-inventory error with a message
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Error::MalformedInventory {
            message: message.into(),
        }
    }
}
