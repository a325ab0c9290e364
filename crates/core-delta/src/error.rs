//! Error types for differencing operations
//!
//! `compare` itself is total: anomalies like mismatched object ids are
//! recorded in the report rather than raised. Errors only arise when a
//! comparison has to harvest a live directory first.

use thiserror::Error;

/// Result type for differencing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing a comparison
#[derive(Error, Debug)]
pub enum Error {
    /// Harvesting or loading an inventory failed
    #[error(transparent)]
    Inventory(#[from] relic_core_inventory::Error),
}
