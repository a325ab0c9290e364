//! The differencing engine: classify every file from two inventories into
//! exactly one of six change types.
//!
//! Signature equality is the primary key and path the tie-breaker, with one
//! exception: a path present on both sides under non-matching signatures is
//! `modified` before any signature-keyed rule runs. For one signature present
//! on both sides, unchanged paths are `identical`; remaining old and new
//! paths pair up in insertion order as `renamed`; surplus new paths become
//! `copied` (the content still exists at a basis path) and surplus old paths
//! become `deleted`.
//!
//! A comparison never fails on mismatched object ids: the report records
//! both ids pipe-separated, since describing abnormal states is exactly what
//! a difference report is for.

use crate::error::Result;
use crate::report::{FileGroupDifference, FileInstanceDifference, FileInventoryDifference};
use chrono::Utc;
use relic_core_inventory::{
    ChecksumAlgorithm, FileInventory, FileManifestation, FileSignature, SignatureIndex,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Compare two inventories of the same logical object.
///
/// Labels are version labels ("v1" vs "v2"); mismatched object ids are
/// recorded in the report rather than raised.
pub fn compare(basis: &FileInventory, other: &FileInventory) -> FileInventoryDifference {
    compare_labeled(basis, other, &basis.version_label(), &other.version_label())
}

/// Compare an inventory against a live directory.
///
/// The directory is harvested into a transient inventory first; the report's
/// `other` label is the directory's basename.
pub fn compare_with_directory(
    basis: &FileInventory,
    directory: &Path,
    algorithms: &[ChecksumAlgorithm],
    default_group_id: &str,
) -> Result<FileInventoryDifference> {
    let other = FileInventory::from_directory(
        directory,
        &basis.object_id,
        basis.version_id,
        algorithms,
        default_group_id,
    )?;
    let label = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.display().to_string());
    Ok(compare_labeled(basis, &other, &basis.version_label(), &label))
}

/// True iff the directory's current state matches the inventory exactly
pub fn verify_against_directory(
    inventory: &FileInventory,
    directory: &Path,
    algorithms: &[ChecksumAlgorithm],
    default_group_id: &str,
) -> Result<bool> {
    let report = compare_with_directory(inventory, directory, algorithms, default_group_id)?;
    Ok(report.difference_count == 0)
}

/// Differencing entry point as an inventory method
pub trait InventoryDifferenceExt {
    /// Compare this inventory (as basis) against another
    fn group_differences_against(&self, other: &FileInventory) -> FileInventoryDifference;
}

impl InventoryDifferenceExt for FileInventory {
    fn group_differences_against(&self, other: &FileInventory) -> FileInventoryDifference {
        compare(self, other)
    }
}

fn compare_labeled(
    basis: &FileInventory,
    other: &FileInventory,
    basis_label: &str,
    other_label: &str,
) -> FileInventoryDifference {
    let digital_object_id = if basis.object_id == other.object_id {
        basis.object_id.clone()
    } else {
        // Cross-object comparison: recorded, not raised
        format!("{}|{}", basis.object_id, other.object_id)
    };

    // Union of group ids, basis order first, then other-only groups
    let mut group_ids: Vec<&str> = basis.group_ids();
    for group_id in other.group_ids() {
        if !group_ids.contains(&group_id) {
            group_ids.push(group_id);
        }
    }

    let group_differences: Vec<FileGroupDifference> = group_ids
        .into_iter()
        .map(|group_id| {
            compare_group(
                group_id,
                basis.group(group_id).map(|g| g.files.as_slice()),
                other.group(group_id).map(|g| g.files.as_slice()),
            )
        })
        .collect();

    let difference_count = group_differences.iter().map(|g| g.difference_count).sum();

    FileInventoryDifference {
        digital_object_id,
        basis: basis_label.to_string(),
        other: other_label.to_string(),
        report_datetime: Utc::now(),
        difference_count,
        group_differences,
    }
}

fn compare_group(
    group_id: &str,
    basis: Option<&[FileManifestation]>,
    other: Option<&[FileManifestation]>,
) -> FileGroupDifference {
    let basis_files = basis.unwrap_or_default();
    let other_files = other.unwrap_or_default();
    let mut diff = FileGroupDifference::new(group_id);

    let other_by_path = path_map(other_files);

    // Path-keyed pass first: same path, non-matching signatures. These
    // instances are withheld from every signature-keyed pool below.
    let mut modified: HashSet<&str> = HashSet::new();
    for manifestation in basis_files {
        for instance in &manifestation.file_instances {
            if let Some(other_signature) = other_by_path.get(instance.path.as_str()) {
                if !manifestation.file_signature.matches(other_signature) {
                    modified.insert(instance.path.as_str());
                    diff.add(FileInstanceDifference::modified(
                        &instance.path,
                        &manifestation.file_signature,
                        other_signature,
                    ));
                }
            }
        }
    }

    // Signature-keyed pass over the basis side
    let other_index =
        SignatureIndex::from_signatures(other_files.iter().map(|m| &m.file_signature));
    let mut consumed = vec![false; other_files.len()];

    for manifestation in basis_files {
        let basis_paths = live_paths(manifestation, &modified);
        let matched_slot = match other_index.lookup(&manifestation.file_signature) {
            Some(slot) if !consumed[slot] => Some(slot),
            _ => None,
        };

        let Some(slot) = matched_slot else {
            for path in &basis_paths {
                diff.add(FileInstanceDifference::deleted(
                    path,
                    &manifestation.file_signature,
                ));
            }
            continue;
        };
        consumed[slot] = true;

        let other_paths = live_paths(&other_files[slot], &modified);
        let basis_set: HashSet<&str> = basis_paths.iter().copied().collect();
        let other_set: HashSet<&str> = other_paths.iter().copied().collect();

        let retained: Vec<&str> = basis_paths
            .iter()
            .copied()
            .filter(|p| other_set.contains(*p))
            .collect();
        let old_only: Vec<&str> = basis_paths
            .iter()
            .copied()
            .filter(|p| !other_set.contains(*p))
            .collect();
        let new_only: Vec<&str> = other_paths
            .iter()
            .copied()
            .filter(|p| !basis_set.contains(*p))
            .collect();

        for path in &retained {
            diff.add(FileInstanceDifference::identical(
                path,
                &manifestation.file_signature,
            ));
        }

        // Renames pair in insertion order; leftovers fall to copied (new
        // side) or deleted (old side), in that priority order.
        let pairs = old_only.len().min(new_only.len());
        for i in 0..pairs {
            diff.add(FileInstanceDifference::renamed(
                old_only[i],
                new_only[i],
                &manifestation.file_signature,
            ));
        }
        let copy_basis = retained
            .first()
            .or_else(|| old_only.first())
            .copied()
            .or_else(|| manifestation.file_instances.first().map(|i| i.path.as_str()))
            .unwrap_or_default();
        for path in &new_only[pairs..] {
            diff.add(FileInstanceDifference::copied(
                copy_basis,
                path,
                &manifestation.file_signature,
            ));
        }
        for path in &old_only[pairs..] {
            diff.add(FileInstanceDifference::deleted(
                path,
                &manifestation.file_signature,
            ));
        }
    }

    // Whatever the basis side never claimed is new content
    for (slot, manifestation) in other_files.iter().enumerate() {
        if consumed[slot] {
            continue;
        }
        for path in live_paths(manifestation, &modified) {
            diff.add(FileInstanceDifference::added(
                path,
                &manifestation.file_signature,
            ));
        }
    }

    diff
}

/// Instance paths of a manifestation minus those claimed by the modified pass
fn live_paths<'a>(
    manifestation: &'a FileManifestation,
    modified: &HashSet<&str>,
) -> Vec<&'a str> {
    manifestation
        .file_instances
        .iter()
        .map(|i| i.path.as_str())
        .filter(|p| !modified.contains(*p))
        .collect()
}

fn path_map(files: &[FileManifestation]) -> HashMap<&str, &FileSignature> {
    let mut map = HashMap::new();
    for manifestation in files {
        for instance in &manifestation.file_instances {
            map.insert(instance.path.as_str(), &manifestation.file_signature);
        }
    }
    map
}
