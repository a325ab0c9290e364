//! Content-addressed signature catalog for Relic
//!
//! The catalog is the single source of truth for "has this exact content
//! been stored before, and where" across the lifetime of a digital object.
//! It grows append-only as versions are ingested; content already cataloged
//! is never re-recorded, which is what makes cross-version storage
//! deduplication work.
//!
//! # Example
//!
//! ```no_run
//! use relic_core_catalog::SignatureCatalog;
//! use relic_core_inventory::FileInventory;
//! use std::path::Path;
//!
//! let inventory = FileInventory::load("versionInventory.json")?;
//! let mut catalog = SignatureCatalog::new("obj-001");
//! let added = catalog.update(&inventory, Path::new("/repo/obj-001"))?;
//! println!("{added} new entries");
//! # Ok::<(), relic_core_catalog::Error>(())
//! ```

pub mod catalog;
pub mod error;

// Re-export main types for convenience
pub use catalog::{SignatureCatalog, SignatureCatalogEntry};
pub use error::{Error, Result};
