/*!
 * Relic - versioned digital preservation storage
 *
 * A library and CLI for managing preservation objects as sequences of
 * immutable versions:
 * - Fixity inventories (md5/sha1/sha256) harvested from directory trees
 * - A content-addressed signature catalog deduplicating storage across versions
 * - A differencing engine classifying changes between any two versions
 * - Deterministic on-disk version layout and BagIt-style export
 */

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{LogLevel, RelicConfig};
pub use error::{RelicError, Result, EXIT_DIFFERENCES, EXIT_FATAL, EXIT_SUCCESS};
pub use storage::{BagSummary, Bagger, IngestSummary, StorageObject, StorageObjectVersion};

pub use relic_core_catalog::{SignatureCatalog, SignatureCatalogEntry};
pub use relic_core_delta::{
    compare, compare_with_directory, verify_against_directory, ChangeType,
    FileInventoryDifference, InventoryDifferenceExt, CHANGE_TYPES,
};
pub use relic_core_inventory::{
    ChecksumAlgorithm, FileGroup, FileInstance, FileInventory, FileManifestation, FileSignature,
    SignatureIndex, VersionMetadata, DEFAULT_ALGORITHMS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
