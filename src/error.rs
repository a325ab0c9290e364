/*!
 * Error types for Relic
 */

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelicError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_DIFFERENCES: i32 = 1;
pub const EXIT_FATAL: i32 = 2;
pub const EXIT_MALFORMED: i32 = 3;
pub const EXIT_MISMATCH: i32 = 4;
pub const EXIT_INVARIANT: i32 = 5;

#[derive(Error, Debug)]
pub enum RelicError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inventory-level error (harvest, load, invariants)
    #[error(transparent)]
    Inventory(#[from] relic_core_inventory::Error),

    /// Catalog-level error (update, load, invariants)
    #[error(transparent)]
    Catalog(#[from] relic_core_catalog::Error),

    /// Differencing error (directory comparison)
    #[error(transparent)]
    Delta(#[from] relic_core_delta::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Version directory layout cannot be resolved
    #[error("Storage layout error at {path}: {message}")]
    StorageLayout { path: PathBuf, message: String },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl RelicError {
    /// Get the process exit code for this error.
    ///
    /// Every error taxonomy kind maps to a distinct status so callers and
    /// scripts can react without parsing messages.
    pub fn exit_code(&self) -> i32 {
        use relic_core_catalog::Error as CatalogError;
        use relic_core_inventory::Error as InventoryError;

        match self {
            RelicError::Inventory(err) => match err {
                InventoryError::NotFound { .. } => EXIT_FATAL,
                InventoryError::MalformedInventory { .. } => EXIT_MALFORMED,
                _ => EXIT_FATAL,
            },
            RelicError::Catalog(err) => match err {
                CatalogError::ObjectMismatch { .. }
                | CatalogError::StorageRootMismatch { .. } => EXIT_MISMATCH,
                CatalogError::DuplicateSignature { .. } => EXIT_INVARIANT,
                CatalogError::MalformedCatalog { .. } => EXIT_MALFORMED,
                _ => EXIT_FATAL,
            },
            RelicError::Delta(relic_core_delta::Error::Inventory(err)) => match err {
                InventoryError::NotFound { .. } => EXIT_FATAL,
                InventoryError::MalformedInventory { .. } => EXIT_MALFORMED,
                _ => EXIT_FATAL,
            },
            RelicError::StorageLayout { .. } => EXIT_FATAL,
            _ => EXIT_FATAL,
        }
    }

    /// Create a storage layout error
    pub fn storage_layout<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        RelicError::StorageLayout {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_fatal() {
        let err = RelicError::Inventory(relic_core_inventory::Error::not_found("/missing"));
        assert_eq!(err.exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_malformed_has_own_status() {
        let err = RelicError::Inventory(relic_core_inventory::Error::malformed("dup group"));
        assert_eq!(err.exit_code(), EXIT_MALFORMED);
    }

    #[test]
    fn test_mismatch_has_own_status() {
        let err = RelicError::Catalog(relic_core_catalog::Error::ObjectMismatch {
            expected: "a".to_string(),
            found: "b".to_string(),
        });
        assert_eq!(err.exit_code(), EXIT_MISMATCH);
    }

    #[test]
    fn test_duplicate_signature_has_own_status() {
        let err = RelicError::Catalog(relic_core_catalog::Error::DuplicateSignature {
            group_id: "content".to_string(),
            storage_path: "v0001/data/content/a".to_string(),
        });
        assert_eq!(err.exit_code(), EXIT_INVARIANT);
    }
}
