//! Inventory data model: instances, manifestations, groups, and the
//! per-version `FileInventory` document.
//!
//! Counts (`file_count`, `byte_count`, `block_count`) are always derived from
//! contents. They are persisted for document compatibility but recomputed and
//! never trusted on load.

use crate::error::{Error, Result};
use crate::signature::{FileSignature, SignatureIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Canonical name of the primary content group
pub const CONTENT_GROUP_ID: &str = "content";

/// Canonical version directory name ("v0001", "v0002", ...)
pub fn version_dirname(version_id: u32) -> String {
    format!("v{version_id:04}")
}

/// Document type marker for persisted inventories
pub const INVENTORY_DOCUMENT_TYPE: &str = "version";

/// A concrete file observed on disk: relative path plus modification time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInstance {
    /// Path relative to the group's data source, '/'-separated
    pub path: String,

    /// Last modification time, UTC, whole seconds
    pub datetime: DateTime<Utc>,
}

impl FileInstance {
    /// Create a new instance
    pub fn new<S: Into<String>>(path: S, datetime: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            datetime,
        }
    }
}

/// One signature plus every instance observed with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileManifestation {
    /// Fixity signature shared by all instances
    pub file_signature: FileSignature,

    /// Instances in first-encounter order; never empty in a valid inventory
    pub file_instances: Vec<FileInstance>,
}

impl FileManifestation {
    /// Create a manifestation with a single instance
    pub fn new(file_signature: FileSignature, instance: FileInstance) -> Self {
        Self {
            file_signature,
            file_instances: vec![instance],
        }
    }

    /// Number of instances
    pub fn file_count(&self) -> u64 {
        self.file_instances.len() as u64
    }

    /// Bytes consumed by all instances
    pub fn byte_count(&self) -> u64 {
        self.file_signature.size * self.file_count()
    }

    /// 1024-byte blocks consumed by all instances
    pub fn block_count(&self) -> u64 {
        self.file_signature.block_count() * self.file_count()
    }

    /// Relative paths of all instances, in insertion order
    pub fn paths(&self) -> Vec<&str> {
        self.file_instances.iter().map(|i| i.path.as_str()).collect()
    }
}

/// A named partition of manifestations (e.g. "content", "metadata")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
    /// Group identifier, unique within one inventory
    pub group_id: String,

    /// Directory the group was harvested from (informational)
    pub data_source: String,

    /// Derived: total file instances
    pub file_count: u64,

    /// Derived: total bytes
    pub byte_count: u64,

    /// Derived: total 1024-byte blocks
    pub block_count: u64,

    /// Manifestations in first-encounter order
    pub files: Vec<FileManifestation>,
}

impl FileGroup {
    /// Create an empty group
    pub fn new<S: Into<String>, D: Into<String>>(group_id: S, data_source: D) -> Self {
        Self {
            group_id: group_id.into(),
            data_source: data_source.into(),
            file_count: 0,
            byte_count: 0,
            block_count: 0,
            files: Vec::new(),
        }
    }

    /// Add an instance, merging into an existing manifestation when the
    /// signature matches one already in the group. The caller-supplied index
    /// must track this group's manifestation signatures by slot.
    pub fn add_instance(
        &mut self,
        index: &mut SignatureIndex,
        signature: FileSignature,
        instance: FileInstance,
    ) {
        match index.lookup(&signature) {
            Some(slot) => self.files[slot].file_instances.push(instance),
            None => {
                index.insert(signature.clone());
                self.files.push(FileManifestation::new(signature, instance));
            }
        }
        self.recompute_counts();
    }

    /// Recompute derived counts from contents
    pub fn recompute_counts(&mut self) {
        self.file_count = self.files.iter().map(FileManifestation::file_count).sum();
        self.byte_count = self.files.iter().map(FileManifestation::byte_count).sum();
        self.block_count = self.files.iter().map(FileManifestation::block_count).sum();
    }

    /// Check the group's structural invariants
    pub fn validate(&self) -> Result<()> {
        let mut seen_paths = HashSet::new();
        for manifestation in &self.files {
            if manifestation.file_instances.is_empty() {
                return Err(Error::malformed(format!(
                    "group '{}' has a manifestation with zero instances",
                    self.group_id
                )));
            }
            if manifestation.file_signature.is_empty() {
                return Err(Error::malformed(format!(
                    "group '{}' has a manifestation with no digests",
                    self.group_id
                )));
            }
            for instance in &manifestation.file_instances {
                if !seen_paths.insert(instance.path.as_str()) {
                    return Err(Error::malformed(format!(
                        "group '{}' lists path '{}' more than once",
                        self.group_id, instance.path
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Complete file state of one object version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInventory {
    /// Document type marker ("version")
    #[serde(rename = "type", default = "default_document_type")]
    pub document_type: String,

    /// Digital object identifier
    pub object_id: String,

    /// Version number this inventory describes
    pub version_id: u32,

    /// When the inventory was produced
    pub inventory_datetime: DateTime<Utc>,

    /// Derived: total file instances across groups
    pub file_count: u64,

    /// Derived: total bytes across groups
    pub byte_count: u64,

    /// Derived: total blocks across groups
    pub block_count: u64,

    /// Groups in canonical order ("content" first, then alphabetical)
    pub file_groups: Vec<FileGroup>,
}

fn default_document_type() -> String {
    INVENTORY_DOCUMENT_TYPE.to_string()
}

impl FileInventory {
    /// Create an empty inventory for an object version
    pub fn new<S: Into<String>>(object_id: S, version_id: u32) -> Self {
        Self {
            document_type: default_document_type(),
            object_id: object_id.into(),
            version_id,
            inventory_datetime: Utc::now(),
            file_count: 0,
            byte_count: 0,
            block_count: 0,
            file_groups: Vec::new(),
        }
    }

    /// Version label used in difference reports ("v1", "v2", ...)
    pub fn version_label(&self) -> String {
        format!("v{}", self.version_id)
    }

    /// Look up a group by id
    pub fn group(&self, group_id: &str) -> Option<&FileGroup> {
        self.file_groups.iter().find(|g| g.group_id == group_id)
    }

    /// Group ids in inventory order
    pub fn group_ids(&self) -> Vec<&str> {
        self.file_groups.iter().map(|g| g.group_id.as_str()).collect()
    }

    /// Append a group, restoring canonical order and derived counts
    pub fn add_group(&mut self, group: FileGroup) {
        self.file_groups.push(group);
        self.sort_groups();
        self.recompute_counts();
    }

    /// Canonical group order: "content" first when present, remainder
    /// alphabetical by group id.
    pub fn sort_groups(&mut self) {
        self.file_groups.sort_by(|a, b| {
            let a_content = a.group_id == CONTENT_GROUP_ID;
            let b_content = b.group_id == CONTENT_GROUP_ID;
            b_content.cmp(&a_content).then_with(|| a.group_id.cmp(&b.group_id))
        });
    }

    /// Recompute aggregate counts from groups
    pub fn recompute_counts(&mut self) {
        for group in &mut self.file_groups {
            group.recompute_counts();
        }
        self.file_count = self.file_groups.iter().map(|g| g.file_count).sum();
        self.byte_count = self.file_groups.iter().map(|g| g.byte_count).sum();
        self.block_count = self.file_groups.iter().map(|g| g.block_count).sum();
    }

    /// Check all structural invariants
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for group in &self.file_groups {
            if !seen.insert(group.group_id.as_str()) {
                return Err(Error::malformed(format!(
                    "duplicate group id: {}",
                    group.group_id
                )));
            }
            group.validate()?;
        }
        Ok(())
    }

    /// Save as a JSON document
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON document, validating invariants and recomputing the
    /// derived counts.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut inventory: FileInventory = serde_json::from_str(&contents)?;
        inventory.validate()?;
        inventory.recompute_counts();
        Ok(inventory)
    }
}
