/*!
 * Bag export: assemble a self-describing package directory for one version.
 *
 * The bag carries the complete file state of the version, not just the
 * files that version introduced: every manifestation is resolved through the
 * signature catalog to the version directory that actually holds its bytes,
 * so exporting v5 pulls unchanged content straight out of v1 without any
 * intermediate re-copying. Digest manifests are written from the inventory's
 * signatures; nothing is re-hashed.
 */

use crate::error::{RelicError, Result};
use crate::storage::object::StorageObject;
use chrono::Utc;
use relic_core_inventory::{ChecksumAlgorithm, FileInventory, DEFAULT_ALGORITHMS};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Outcome of a bag export
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagSummary {
    /// Version exported
    pub version_id: u32,

    /// Payload files written under data/
    pub file_count: u64,

    /// Payload bytes written
    pub byte_count: u64,
}

/// Assembles bag directories from stored versions
#[derive(Debug)]
pub struct Bagger<'a> {
    object: &'a StorageObject,
}

impl<'a> Bagger<'a> {
    /// Create a bagger over a storage object
    pub fn new(object: &'a StorageObject) -> Self {
        Self { object }
    }

    /// Export one version into `dest` as a bag directory.
    ///
    /// `dest` must not already exist; a partially written bag is never
    /// silently reused.
    pub fn fill_bag(&self, version_id: u32, dest: &Path) -> Result<BagSummary> {
        if dest.exists() {
            return Err(RelicError::storage_layout(
                dest,
                "bag destination already exists",
            ));
        }
        let inventory = self.object.load_inventory(version_id)?;
        let catalog = self.object.load_catalog(version_id)?;

        std::fs::create_dir_all(dest.join("data"))?;

        let mut file_count = 0u64;
        let mut byte_count = 0u64;
        for group in &inventory.file_groups {
            for manifestation in &group.files {
                let storage_path = catalog
                    .path_for_signature(&manifestation.file_signature)
                    .ok_or_else(|| {
                        RelicError::storage_layout(
                            self.object.home(),
                            format!(
                                "catalog has no entry for {}",
                                manifestation.file_signature
                            ),
                        )
                    })?;
                let source = self.object.resolve_storage_path(storage_path);
                for instance in &manifestation.file_instances {
                    let target = dest
                        .join("data")
                        .join(&group.group_id)
                        .join(&instance.path);
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::copy(&source, &target)?;
                    file_count += 1;
                    byte_count += manifestation.file_signature.size;
                }
            }
        }

        self.write_tag_files(&inventory, dest, file_count, byte_count)?;

        info!(
            version = version_id,
            files = file_count,
            bytes = byte_count,
            dest = %dest.display(),
            "bag exported"
        );
        Ok(BagSummary {
            version_id,
            file_count,
            byte_count,
        })
    }

    fn write_tag_files(
        &self,
        inventory: &FileInventory,
        dest: &Path,
        file_count: u64,
        byte_count: u64,
    ) -> Result<()> {
        std::fs::write(
            dest.join("bagit.txt"),
            "BagIt-Version: 0.97\nTag-File-Character-Encoding: UTF-8\n",
        )?;

        let mut info = String::new();
        let _ = writeln!(info, "Bagging-Date: {}", Utc::now().format("%Y-%m-%d"));
        let _ = writeln!(info, "External-Identifier: {}", self.object.object_id());
        let _ = writeln!(info, "Relic-Version-Id: {}", inventory.version_label());
        let _ = writeln!(info, "Payload-Oxum: {}.{}", byte_count, file_count);
        std::fs::write(dest.join("bag-info.txt"), info)?;

        for algorithm in DEFAULT_ALGORITHMS {
            let manifest = self.digest_manifest(inventory, algorithm);
            if !manifest.is_empty() {
                std::fs::write(
                    dest.join(format!("manifest-{algorithm}.txt")),
                    manifest,
                )?;
            }
        }
        Ok(())
    }

    /// Manifest lines for one algorithm, skipping signatures lacking it
    fn digest_manifest(&self, inventory: &FileInventory, algorithm: ChecksumAlgorithm) -> String {
        let mut manifest = String::new();
        for group in &inventory.file_groups {
            for manifestation in &group.files {
                let Some(digest) = manifestation.file_signature.digest(algorithm) else {
                    continue;
                };
                for instance in &manifestation.file_instances {
                    let _ = writeln!(
                        manifest,
                        "{}  data/{}/{}",
                        digest, group.group_id, instance.path
                    );
                }
            }
        }
        manifest
    }
}
