/*!
 * Storage-object layout and packaging
 */

pub mod bagger;
pub mod object;

pub use bagger::{BagSummary, Bagger};
pub use object::{
    IngestSummary, StorageObject, StorageObjectVersion, CATALOG_FILENAME, INVENTORY_FILENAME,
    VERSION_METADATA_FILENAME,
};
