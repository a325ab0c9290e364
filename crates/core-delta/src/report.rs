//! Structured change reports produced by the differencing engine.
//!
//! Every file instance from either side of a comparison lands in exactly one
//! subset of exactly one group difference. `difference_count` totals the
//! files in non-identical subsets.

use chrono::{DateTime, Utc};
use relic_core_inventory::FileSignature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The six mutually exclusive change classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Same signature, same path set
    Identical,
    /// Signature only in the other inventory, path previously unused
    Added,
    /// Signature only in the basis inventory
    Deleted,
    /// Same path, different signature
    Modified,
    /// Same signature, path changed
    Renamed,
    /// Same signature at a new path while an old path is retained
    Copied,
}

/// All change types, in report order
pub const CHANGE_TYPES: [ChangeType; 6] = [
    ChangeType::Identical,
    ChangeType::Added,
    ChangeType::Deleted,
    ChangeType::Modified,
    ChangeType::Renamed,
    ChangeType::Copied,
];

impl ChangeType {
    /// String name used in persisted reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Identical => "identical",
            ChangeType::Added => "added",
            ChangeType::Deleted => "deleted",
            ChangeType::Modified => "modified",
            ChangeType::Renamed => "renamed",
            ChangeType::Copied => "copied",
        }
    }

    /// True for every classification except `identical`
    pub fn is_difference(&self) -> bool {
        !matches!(self, ChangeType::Identical)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file's classification, with the signature(s) relevant to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInstanceDifference {
    /// Classification
    pub change: ChangeType,

    /// Path on the basis side, when the file existed there
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_path: Option<String>,

    /// Path on the other side, when the file exists there
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_path: Option<String>,

    /// Signature on the basis side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_signature: Option<FileSignature>,

    /// Signature on the other side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_signature: Option<FileSignature>,
}

impl FileInstanceDifference {
    /// Same content at the same path on both sides
    pub fn identical(path: &str, signature: &FileSignature) -> Self {
        Self {
            change: ChangeType::Identical,
            basis_path: Some(path.to_string()),
            other_path: Some(path.to_string()),
            basis_signature: Some(signature.clone()),
            other_signature: Some(signature.clone()),
        }
    }

    /// Content new to the other side
    pub fn added(path: &str, signature: &FileSignature) -> Self {
        Self {
            change: ChangeType::Added,
            basis_path: None,
            other_path: Some(path.to_string()),
            basis_signature: None,
            other_signature: Some(signature.clone()),
        }
    }

    /// Content gone from the other side
    pub fn deleted(path: &str, signature: &FileSignature) -> Self {
        Self {
            change: ChangeType::Deleted,
            basis_path: Some(path.to_string()),
            other_path: None,
            basis_signature: Some(signature.clone()),
            other_signature: None,
        }
    }

    /// Same path, content changed; carries both signatures
    pub fn modified(path: &str, basis: &FileSignature, other: &FileSignature) -> Self {
        Self {
            change: ChangeType::Modified,
            basis_path: Some(path.to_string()),
            other_path: Some(path.to_string()),
            basis_signature: Some(basis.clone()),
            other_signature: Some(other.clone()),
        }
    }

    /// Same content moved from one path to another
    pub fn renamed(basis_path: &str, other_path: &str, signature: &FileSignature) -> Self {
        Self {
            change: ChangeType::Renamed,
            basis_path: Some(basis_path.to_string()),
            other_path: Some(other_path.to_string()),
            basis_signature: Some(signature.clone()),
            other_signature: Some(signature.clone()),
        }
    }

    /// Same content at an additional path while an old path is retained
    pub fn copied(basis_path: &str, other_path: &str, signature: &FileSignature) -> Self {
        Self {
            change: ChangeType::Copied,
            basis_path: Some(basis_path.to_string()),
            other_path: Some(other_path.to_string()),
            basis_signature: Some(signature.clone()),
            other_signature: Some(signature.clone()),
        }
    }
}

/// All files of one group sharing one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroupDifferenceSubset {
    /// The classification shared by every file below
    pub change: ChangeType,

    /// Derived: number of file differences
    pub file_count: u64,

    /// File differences, in classification order
    pub file_instance_differences: Vec<FileInstanceDifference>,
}

impl FileGroupDifferenceSubset {
    fn new(change: ChangeType) -> Self {
        Self {
            change,
            file_count: 0,
            file_instance_differences: Vec::new(),
        }
    }
}

/// Per-group change report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroupDifference {
    /// Group the changes belong to
    pub group_id: String,

    /// Derived: files in non-identical subsets
    pub difference_count: u64,

    /// Populated subsets keyed by change type; empty subsets are omitted
    pub subsets: BTreeMap<ChangeType, FileGroupDifferenceSubset>,
}

impl FileGroupDifference {
    /// Create an empty group difference
    pub fn new<S: Into<String>>(group_id: S) -> Self {
        Self {
            group_id: group_id.into(),
            difference_count: 0,
            subsets: BTreeMap::new(),
        }
    }

    /// Record one file difference in its subset
    pub fn add(&mut self, difference: FileInstanceDifference) {
        let subset = self
            .subsets
            .entry(difference.change)
            .or_insert_with(|| FileGroupDifferenceSubset::new(difference.change));
        subset.file_instance_differences.push(difference);
        subset.file_count = subset.file_instance_differences.len() as u64;
        self.recount();
    }

    /// Subset for a classification, if populated
    pub fn subset(&self, change: ChangeType) -> Option<&FileGroupDifferenceSubset> {
        self.subsets.get(&change)
    }

    /// Number of files classified under `change`
    pub fn count(&self, change: ChangeType) -> u64 {
        self.subset(change).map_or(0, |s| s.file_count)
    }

    /// Total files across all subsets, identical included
    pub fn total_file_count(&self) -> u64 {
        self.subsets.values().map(|s| s.file_count).sum()
    }

    fn recount(&mut self) {
        self.difference_count = self
            .subsets
            .iter()
            .filter(|(change, _)| change.is_difference())
            .map(|(_, subset)| subset.file_count)
            .sum();
    }
}

/// Complete change report between two inventories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInventoryDifference {
    /// Object id of both sides, or "basisId|otherId" when a cross-object
    /// comparison was recorded
    pub digital_object_id: String,

    /// Label of the basis side ("v1", ...)
    pub basis: String,

    /// Label of the other side ("v2", or a directory basename)
    pub other: String,

    /// When the report was produced
    pub report_datetime: DateTime<Utc>,

    /// Derived: sum of group difference counts
    pub difference_count: u64,

    /// Per-group reports, basis group order first
    pub group_differences: Vec<FileGroupDifference>,
}

impl FileInventoryDifference {
    /// Group report by id, if present
    pub fn group(&self, group_id: &str) -> Option<&FileGroupDifference> {
        self.group_differences.iter().find(|g| g.group_id == group_id)
    }

    /// Total files classified under `change` across groups
    pub fn count(&self, change: ChangeType) -> u64 {
        self.group_differences.iter().map(|g| g.count(change)).sum()
    }

    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "{}: {} vs {}: {} difference(s)",
            self.digital_object_id, self.basis, self.other, self.difference_count
        )
    }
}
