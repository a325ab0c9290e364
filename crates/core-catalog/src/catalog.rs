//! The signature catalog: a cumulative, version-spanning index mapping
//! content signatures to the storage path where the bytes were first laid
//! down.
//!
//! The catalog is append-only. `update` records only genuinely new content,
//! which is how cross-version deduplication works: a file re-ingested
//! unchanged in a later version adds zero entries and zero stored bytes.
//! Existing entries are never mutated and `original_version` never changes.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use relic_core_inventory::{
    version_dirname, FileGroup, FileInventory, FileSignature, SignatureIndex,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One catalog row: a signature and where its bytes live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureCatalogEntry {
    /// Version that first introduced this content
    pub original_version: u32,

    /// Group the content was ingested under
    pub group_id: String,

    /// Path relative to the object home, e.g. "v0001/data/content/a.txt"
    pub storage_path: String,

    /// The content signature
    pub file_signature: FileSignature,
}

/// Cumulative signature catalog for one digital object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureCatalog {
    /// Digital object identifier
    pub object_id: String,

    /// Latest version reflected by the catalog (0 before any update)
    pub version_id: u32,

    /// When the catalog was last written
    pub catalog_datetime: DateTime<Utc>,

    /// Derived: number of entries
    pub file_count: u64,

    /// Derived: total bytes of distinct content
    pub byte_count: u64,

    /// Derived: total 1024-byte blocks of distinct content
    pub block_count: u64,

    /// Entries in the order content was first seen, across all versions
    pub entries: Vec<SignatureCatalogEntry>,

    /// Lookup structure, rebuilt on load
    #[serde(skip)]
    index: SignatureIndex,
}

impl PartialEq for SignatureCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.object_id == other.object_id
            && self.version_id == other.version_id
            && self.catalog_datetime == other.catalog_datetime
            && self.entries == other.entries
    }
}

impl SignatureCatalog {
    /// Create an empty catalog for an object
    pub fn new<S: Into<String>>(object_id: S) -> Self {
        Self {
            object_id: object_id.into(),
            version_id: 0,
            catalog_datetime: Utc::now(),
            file_count: 0,
            byte_count: 0,
            block_count: 0,
            entries: Vec::new(),
            index: SignatureIndex::new(),
        }
    }

    /// Number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Absorb a new version's inventory, appending one entry per signature
    /// not already cataloged. Returns the number of entries added.
    ///
    /// `storage_root` is the object's home directory; its final component
    /// must be the catalog's object id.
    pub fn update(&mut self, inventory: &FileInventory, storage_root: &Path) -> Result<usize> {
        if inventory.object_id != self.object_id {
            return Err(Error::ObjectMismatch {
                expected: self.object_id.clone(),
                found: inventory.object_id.clone(),
            });
        }
        let root_name = storage_root.file_name().map(|n| n.to_string_lossy());
        if root_name.as_deref() != Some(self.object_id.as_str()) {
            return Err(Error::StorageRootMismatch {
                root: storage_root.to_path_buf(),
                object_id: self.object_id.clone(),
            });
        }
        inventory.validate()?;

        let mut added = 0;
        for group in &inventory.file_groups {
            for manifestation in &group.files {
                if self.index.contains(&manifestation.file_signature) {
                    continue;
                }
                let first = manifestation.file_instances.first().ok_or_else(|| {
                    relic_core_inventory::Error::malformed(format!(
                        "group '{}' has a manifestation with zero instances",
                        group.group_id
                    ))
                })?;
                let storage_path = format!(
                    "{}/data/{}/{}",
                    version_dirname(inventory.version_id),
                    group.group_id,
                    first.path
                );
                self.index.insert(manifestation.file_signature.clone());
                self.entries.push(SignatureCatalogEntry {
                    original_version: inventory.version_id,
                    group_id: group.group_id.clone(),
                    storage_path,
                    file_signature: manifestation.file_signature.clone(),
                });
                added += 1;
            }
        }

        self.version_id = inventory.version_id;
        self.catalog_datetime = Utc::now();
        self.recompute_counts();
        Ok(added)
    }

    /// Dry-run counterpart to [`update`](Self::update): an inventory-shaped
    /// report holding only the manifestations whose signatures the catalog
    /// has never seen, with group structure preserved. Never mutates.
    pub fn version_additions(&self, inventory: &FileInventory) -> FileInventory {
        let mut report = FileInventory::new(inventory.object_id.clone(), inventory.version_id);
        for group in &inventory.file_groups {
            let mut additions = FileGroup::new(group.group_id.clone(), group.data_source.clone());
            additions.files = group
                .files
                .iter()
                .filter(|m| !self.index.contains(&m.file_signature))
                .cloned()
                .collect();
            report.add_group(additions);
        }
        report
    }

    /// Entry whose signature matches the probe, if cataloged
    pub fn entry_for_signature(&self, signature: &FileSignature) -> Option<&SignatureCatalogEntry> {
        self.index.lookup(signature).map(|slot| &self.entries[slot])
    }

    /// Storage path (relative to the object home) holding the probe's bytes
    pub fn path_for_signature(&self, signature: &FileSignature) -> Option<&str> {
        self.entry_for_signature(signature)
            .map(|e| e.storage_path.as_str())
    }

    /// Recompute derived counts from entries
    pub fn recompute_counts(&mut self) {
        self.file_count = self.entries.len() as u64;
        self.byte_count = self.entries.iter().map(|e| e.file_signature.size).sum();
        self.block_count = self
            .entries
            .iter()
            .map(|e| e.file_signature.block_count())
            .sum();
    }

    /// Check the per-group uniqueness invariant. Unreachable through
    /// `update`; guards externally produced documents.
    pub fn validate(&self) -> Result<()> {
        let mut group_ids: Vec<&str> = self.entries.iter().map(|e| e.group_id.as_str()).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        for group_id in group_ids {
            let mut index = SignatureIndex::new();
            for entry in self.entries.iter().filter(|e| e.group_id == group_id) {
                if index.contains(&entry.file_signature) {
                    return Err(Error::DuplicateSignature {
                        group_id: entry.group_id.clone(),
                        storage_path: entry.storage_path.clone(),
                    });
                }
                index.insert(entry.file_signature.clone());
            }
        }
        Ok(())
    }

    /// Save as a JSON document
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON document, validating invariants and rebuilding the
    /// lookup index.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut catalog: SignatureCatalog = serde_json::from_str(&contents)?;
        catalog.validate()?;
        catalog.index =
            SignatureIndex::from_signatures(catalog.entries.iter().map(|e| &e.file_signature));
        catalog.recompute_counts();
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relic_core_inventory::{ChecksumAlgorithm, FileInstance, FileManifestation};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sig(size: u64, sha256: &str) -> FileSignature {
        let mut digests = BTreeMap::new();
        digests.insert(ChecksumAlgorithm::Sha256, sha256.to_string());
        FileSignature::new(size, digests)
    }

    fn manifestation(size: u64, digest: &str, path: &str) -> FileManifestation {
        FileManifestation::new(sig(size, digest), FileInstance::new(path, Utc::now()))
    }

    fn inventory(object_id: &str, version_id: u32, entries: &[(u64, &str, &str)]) -> FileInventory {
        let mut inv = FileInventory::new(object_id, version_id);
        let mut group = FileGroup::new("content", "/ingest/content");
        for (size, digest, path) in entries {
            group.files.push(manifestation(*size, digest, path));
        }
        inv.add_group(group);
        inv
    }

    fn storage_root(object_id: &str) -> PathBuf {
        PathBuf::from("/repo").join(object_id)
    }

    #[test]
    fn test_update_populates_empty_catalog() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let inv = inventory("obj-001", 1, &[(5, "aa", "a.txt"), (7, "bb", "b.txt")]);

        let added = catalog.update(&inv, &storage_root("obj-001")).unwrap();

        assert_eq!(added, 2);
        assert_eq!(catalog.version_id, 1);
        assert_eq!(catalog.entry_count(), 2);
        assert_eq!(
            catalog.entries[0].storage_path,
            "v0001/data/content/a.txt"
        );
        assert_eq!(catalog.entries[0].original_version, 1);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let inv = inventory("obj-001", 1, &[(5, "aa", "a.txt")]);

        assert_eq!(catalog.update(&inv, &storage_root("obj-001")).unwrap(), 1);
        assert_eq!(catalog.update(&inv, &storage_root("obj-001")).unwrap(), 0);
        assert_eq!(catalog.entry_count(), 1);
    }

    #[test]
    fn test_update_dedups_across_versions() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let v1 = inventory("obj-001", 1, &[(5, "aa", "a.txt"), (7, "bb", "b.txt")]);
        catalog.update(&v1, &storage_root("obj-001")).unwrap();

        // v2 keeps b.txt's content (renamed) and adds one new file
        let v2 = inventory(
            "obj-001",
            2,
            &[(7, "bb", "renamed-b.txt"), (9, "cc", "c.txt")],
        );
        let added = catalog.update(&v2, &storage_root("obj-001")).unwrap();

        assert_eq!(added, 1);
        assert_eq!(catalog.version_id, 2);
        assert_eq!(catalog.entry_count(), 3);
        // Pre-existing content keeps its v1 storage path and origin
        let entry = catalog.entry_for_signature(&sig(7, "bb")).unwrap();
        assert_eq!(entry.original_version, 1);
        assert_eq!(entry.storage_path, "v0001/data/content/b.txt");
    }

    #[test]
    fn test_update_rejects_foreign_object() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let inv = inventory("obj-002", 1, &[(5, "aa", "a.txt")]);

        let result = catalog.update(&inv, &storage_root("obj-001"));
        assert!(matches!(result, Err(Error::ObjectMismatch { .. })));
    }

    #[test]
    fn test_update_rejects_wrong_storage_root() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let inv = inventory("obj-001", 1, &[(5, "aa", "a.txt")]);

        let result = catalog.update(&inv, &storage_root("obj-999"));
        assert!(matches!(result, Err(Error::StorageRootMismatch { .. })));
    }

    #[test]
    fn test_version_additions_filters_known_content() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let v1 = inventory("obj-001", 1, &[(5, "aa", "a.txt"), (7, "bb", "b.txt")]);
        catalog.update(&v1, &storage_root("obj-001")).unwrap();

        let v2 = inventory(
            "obj-001",
            2,
            &[(5, "aa", "a.txt"), (9, "cc", "c.txt"), (11, "dd", "d.txt")],
        );
        let additions = catalog.version_additions(&v2);

        assert_eq!(additions.file_count, 2);
        assert_eq!(additions.byte_count, 20);
        assert_eq!(additions.version_id, 2);
        assert_eq!(additions.group_ids(), vec!["content"]);
        // Dry run: catalog untouched
        assert_eq!(catalog.entry_count(), 2);
    }

    #[test]
    fn test_version_additions_preserves_group_structure() {
        let catalog = SignatureCatalog::new("obj-001");
        let mut inv = inventory("obj-001", 1, &[(5, "aa", "a.txt")]);
        let mut metadata = FileGroup::new("metadata", "/ingest/metadata");
        metadata.files.push(manifestation(3, "mm", "desc.json"));
        inv.add_group(metadata);

        let additions = catalog.version_additions(&inv);
        assert_eq!(additions.group_ids(), vec!["content", "metadata"]);
        assert_eq!(additions.file_count, 2);
    }

    #[test]
    fn test_path_for_signature() {
        let mut catalog = SignatureCatalog::new("obj-001");
        let inv = inventory("obj-001", 1, &[(5, "aa", "a.txt")]);
        catalog.update(&inv, &storage_root("obj-001")).unwrap();

        assert_eq!(
            catalog.path_for_signature(&sig(5, "aa")),
            Some("v0001/data/content/a.txt")
        );
        assert_eq!(catalog.path_for_signature(&sig(5, "zz")), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatureCatalog.json");

        let mut catalog = SignatureCatalog::new("obj-001");
        let inv = inventory("obj-001", 1, &[(5, "aa", "a.txt"), (7, "bb", "b.txt")]);
        catalog.update(&inv, &storage_root("obj-001")).unwrap();
        catalog.save(&path).unwrap();

        let loaded = SignatureCatalog::load(&path).unwrap();
        assert_eq!(loaded, catalog);
        // Rebuilt index answers lookups
        assert!(loaded.path_for_signature(&sig(5, "aa")).is_some());
    }

    #[test]
    fn test_load_rejects_duplicate_signatures_in_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatureCatalog.json");

        let mut catalog = SignatureCatalog::new("obj-001");
        catalog.entries.push(SignatureCatalogEntry {
            original_version: 1,
            group_id: "content".to_string(),
            storage_path: "v0001/data/content/a.txt".to_string(),
            file_signature: sig(5, "aa"),
        });
        catalog.entries.push(SignatureCatalogEntry {
            original_version: 2,
            group_id: "content".to_string(),
            storage_path: "v0002/data/content/b.txt".to_string(),
            file_signature: sig(5, "aa"),
        });
        catalog.save(&path).unwrap();

        let result = SignatureCatalog::load(&path);
        assert!(matches!(result, Err(Error::DuplicateSignature { .. })));
    }

    #[test]
    fn test_document_field_names() {
        let catalog = SignatureCatalog::new("obj-001");
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.contains("\"objectId\":\"obj-001\""));
        assert!(json.contains("\"catalogDatetime\""));
        assert!(json.contains("\"versionId\":0"));
    }
}
