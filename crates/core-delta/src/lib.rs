//! Inventory differencing for Relic
//!
//! Compares two `FileInventory` documents (or an inventory against a live
//! directory) and classifies every file into exactly one of six change
//! types: identical, added, deleted, modified, renamed, or copied.
//!
//! # Example
//!
//! ```no_run
//! use relic_core_delta::{compare, ChangeType};
//! use relic_core_inventory::FileInventory;
//!
//! let v1 = FileInventory::load("v0001/manifests/versionInventory.json")?;
//! let v2 = FileInventory::load("v0002/manifests/versionInventory.json")?;
//!
//! let report = compare(&v1, &v2);
//! println!("{}", report.summary());
//! println!("{} file(s) modified", report.count(ChangeType::Modified));
//! # Ok::<(), relic_core_inventory::Error>(())
//! ```

pub mod compare;
pub mod error;
pub mod report;

// Re-export main types for convenience
pub use compare::{
    compare, compare_with_directory, verify_against_directory, InventoryDifferenceExt,
};
pub use error::{Error, Result};
pub use report::{
    ChangeType, FileGroupDifference, FileGroupDifferenceSubset, FileInstanceDifference,
    FileInventoryDifference, CHANGE_TYPES,
};
