//! Core inventory data structures for Relic
//!
//! This crate provides the fixity data model for versioned preservation
//! objects: content signatures, per-version file inventories harvested from
//! directory trees, and the provenance trail recorded alongside each version.
//!
//! # Key Concepts
//!
//! - **Signature**: size plus one or more checksums, identifying content
//!   independent of path
//! - **Manifestation**: one signature and every path observed with it
//! - **Inventory**: the complete, grouped file state of one object version
//!
//! # Example
//!
//! ```no_run
//! use relic_core_inventory::{FileInventory, DEFAULT_ALGORITHMS};
//! use std::path::Path;
//!
//! let inventory = FileInventory::from_directory(
//!     Path::new("/data/ingest/obj-001"),
//!     "obj-001",
//!     1,
//!     &DEFAULT_ALGORITHMS,
//!     "content",
//! )?;
//! # Ok::<(), relic_core_inventory::Error>(())
//! ```

pub mod error;
pub mod harvest;
pub mod inventory;
pub mod metadata;
pub mod signature;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use inventory::{
    version_dirname, FileGroup, FileInstance, FileInventory, FileManifestation,
    CONTENT_GROUP_ID, INVENTORY_DOCUMENT_TYPE,
};
pub use metadata::{EventType, VersionEvent, VersionMetadata, VersionMetadataEntry};
pub use signature::{ChecksumAlgorithm, FileSignature, SignatureIndex, DEFAULT_ALGORITHMS};
