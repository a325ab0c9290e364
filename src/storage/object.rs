/*!
 * Physical layout of a versioned storage object.
 *
 * An object home directory holds one subdirectory per immutable version:
 *
 * ```text
 * <object_home>/
 *   versionMetadata.json
 *   v0001/
 *     manifests/versionInventory.json
 *     manifests/signatureCatalog.json
 *     data/<group_id>/...
 *   v0002/
 *     ...
 * ```
 *
 * Version data directories contain only content new to that version; the
 * signature catalog records where every signature's bytes physically live,
 * so later versions and bag exports reference earlier directories instead of
 * re-copying unchanged files.
 */

use crate::config::RelicConfig;
use crate::error::{RelicError, Result};
use relic_core_inventory::{
    version_dirname, EventType, FileInventory, VersionEvent, VersionMetadata,
};
use relic_core_catalog::SignatureCatalog;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Filename of the persisted inventory document
pub const INVENTORY_FILENAME: &str = "versionInventory.json";

/// Filename of the persisted catalog document
pub const CATALOG_FILENAME: &str = "signatureCatalog.json";

/// Filename of the persisted provenance document
pub const VERSION_METADATA_FILENAME: &str = "versionMetadata.json";

/// A resolved version subdirectory under an object home
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObjectVersion {
    /// Version number
    pub version_id: u32,

    /// Absolute version directory (object_home/vNNNN)
    pub path: PathBuf,
}

impl StorageObjectVersion {
    /// Resolve the deterministic version subdirectory for a version number
    pub fn path_for(object_home: &Path, version_id: u32) -> PathBuf {
        object_home.join(version_dirname(version_id))
    }

    /// Create a resolved version handle
    pub fn new(object_home: &Path, version_id: u32) -> Self {
        Self {
            version_id,
            path: Self::path_for(object_home, version_id),
        }
    }

    /// Directory holding the version's manifest documents
    pub fn manifests_path(&self) -> PathBuf {
        self.path.join("manifests")
    }

    /// Directory holding the version's packaged content
    pub fn data_path(&self) -> PathBuf {
        self.path.join("data")
    }

    /// Path of the version's inventory document
    pub fn inventory_path(&self) -> PathBuf {
        self.manifests_path().join(INVENTORY_FILENAME)
    }

    /// Path of the version's catalog document
    pub fn catalog_path(&self) -> PathBuf {
        self.manifests_path().join(CATALOG_FILENAME)
    }
}

/// Outcome of a versioned ingest
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Version number created
    pub version_id: u32,

    /// Files in the version's inventory
    pub file_count: u64,

    /// Catalog entries added (distinct new signatures)
    pub new_entries: usize,

    /// Files physically copied into the version directory
    pub files_stored: u64,

    /// Bytes physically copied
    pub bytes_stored: u64,
}

/// A digital object's home directory and the operations over it
#[derive(Debug, Clone)]
pub struct StorageObject {
    object_id: String,
    home: PathBuf,
}

impl StorageObject {
    /// Address an object under a repository root; the home directory is
    /// `<repository_root>/<object_id>` and need not exist yet.
    pub fn new<S: Into<String>>(object_id: S, repository_root: &Path) -> Self {
        let object_id = object_id.into();
        let home = repository_root.join(&object_id);
        Self { object_id, home }
    }

    /// Address an object by its existing home directory; the object id is
    /// the directory's name.
    pub fn from_home(home: &Path) -> Result<Self> {
        let object_id = home
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RelicError::storage_layout(home, "home directory has no final component")
            })?;
        Ok(Self {
            object_id,
            home: home.to_path_buf(),
        })
    }

    /// Digital object identifier
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Object home directory
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolved handle for a version subdirectory
    pub fn version(&self, version_id: u32) -> StorageObjectVersion {
        StorageObjectVersion::new(&self.home, version_id)
    }

    /// Path of the object's provenance document
    pub fn version_metadata_path(&self) -> PathBuf {
        self.home.join(VERSION_METADATA_FILENAME)
    }

    /// Highest version number present on disk; 0 when the object has no
    /// versions yet. A directory looking like a version but not parsing as
    /// one is a layout error, never silently skipped.
    pub fn current_version_id(&self) -> Result<u32> {
        if !self.home.exists() {
            return Ok(0);
        }
        let mut current = 0;
        for entry in std::fs::read_dir(&self.home)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(digits) = name.strip_prefix('v') else {
                continue;
            };
            let version_id: u32 = digits.parse().map_err(|_| {
                RelicError::storage_layout(
                    entry.path(),
                    format!("'{name}' is not a valid version directory name"),
                )
            })?;
            if name != version_dirname(version_id) {
                return Err(RelicError::storage_layout(
                    entry.path(),
                    format!("'{name}' is not zero-padded to four digits"),
                ));
            }
            current = current.max(version_id);
        }
        Ok(current)
    }

    /// Load a version's inventory document
    pub fn load_inventory(&self, version_id: u32) -> Result<FileInventory> {
        Ok(FileInventory::load(self.version(version_id).inventory_path())?)
    }

    /// Load a version's catalog document
    pub fn load_catalog(&self, version_id: u32) -> Result<SignatureCatalog> {
        Ok(SignatureCatalog::load(self.version(version_id).catalog_path())?)
    }

    /// Absolute path of bytes recorded under a catalog storage path
    pub fn resolve_storage_path(&self, storage_path: &str) -> PathBuf {
        self.home.join(storage_path)
    }

    /// Ingest a source directory as the object's next version.
    ///
    /// Harvests an inventory, copies only content the catalog has never seen
    /// into the new version's data directory, updates the catalog, writes
    /// both manifest documents, and appends an ingest event to the
    /// provenance trail.
    pub fn ingest_version(&self, source_dir: &Path, config: &RelicConfig) -> Result<IngestSummary> {
        let current = self.current_version_id()?;
        let new_version_id = current + 1;
        info!(
            object_id = %self.object_id,
            version = new_version_id,
            source = %source_dir.display(),
            "ingesting version"
        );

        let inventory = FileInventory::from_directory(
            source_dir,
            &self.object_id,
            new_version_id,
            &config.algorithms,
            &config.default_group_id,
        )?;

        let mut catalog = if current == 0 {
            SignatureCatalog::new(&self.object_id)
        } else {
            self.load_catalog(current)?
        };

        let additions = catalog.version_additions(&inventory);
        let new_entries = catalog.update(&inventory, &self.home)?;

        let version = self.version(new_version_id);
        std::fs::create_dir_all(version.manifests_path())?;
        std::fs::create_dir_all(version.data_path())?;

        // One stored copy per new signature: the first instance is the copy
        // the catalog's storage path points at.
        let mut files_stored = 0;
        let mut bytes_stored = 0;
        for group in &additions.file_groups {
            for manifestation in &group.files {
                let Some(first) = manifestation.file_instances.first() else {
                    continue;
                };
                let source = Path::new(&group.data_source).join(&first.path);
                let target = version.data_path().join(&group.group_id).join(&first.path);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(&source, &target)?;
                files_stored += 1;
                bytes_stored += manifestation.file_signature.size;
                debug!(path = %first.path, group = %group.group_id, "stored new content");
            }
        }

        inventory.save(version.inventory_path())?;
        catalog.save(version.catalog_path())?;

        let mut metadata = if self.version_metadata_path().exists() {
            VersionMetadata::load(self.version_metadata_path())?
        } else {
            VersionMetadata::new(&self.object_id)
        };
        metadata.record(
            new_version_id,
            VersionEvent::now(
                EventType::Ingest,
                format!("ingested from {}", source_dir.display()),
            ),
        );
        metadata.save(self.version_metadata_path())?;

        info!(
            version = new_version_id,
            files = inventory.file_count,
            stored = files_stored,
            reused = inventory.file_count - files_stored,
            "version ingested"
        );
        Ok(IngestSummary {
            version_id: new_version_id,
            file_count: inventory.file_count,
            new_entries,
            files_stored,
            bytes_stored,
        })
    }
}
