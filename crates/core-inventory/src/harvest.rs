//! Directory harvesting: build a `FileInventory` from a live directory tree.
//!
//! Immediate subdirectories of the root become groups named after the
//! subdirectory; a root with no subdirectories yields a single group using
//! the caller's default group id. File paths are sorted lexicographically
//! before hashing so manifestation order is deterministic regardless of
//! filesystem iteration order; per-file digests run in parallel and are
//! merged back in that sorted order.

use crate::error::{Error, Result};
use crate::inventory::{FileGroup, FileInstance, FileInventory};
use crate::signature::{ChecksumAlgorithm, FileSignature, SignatureIndex};
use chrono::{DateTime, SubsecRound, Utc};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One group's name and the directory its files come from
struct GroupSource {
    group_id: String,
    source: PathBuf,
}

impl FileInventory {
    /// Harvest an inventory from a directory tree.
    ///
    /// Never mutates the filesystem. Fails with `NotFound` when `root` does
    /// not exist or is not a directory.
    pub fn from_directory(
        root: &Path,
        object_id: &str,
        version_id: u32,
        algorithms: &[ChecksumAlgorithm],
        default_group_id: &str,
    ) -> Result<Self> {
        if algorithms.is_empty() {
            return Err(Error::EmptyAlgorithmSet);
        }
        if !root.is_dir() {
            return Err(Error::not_found(root));
        }

        let mut inventory = FileInventory::new(object_id, version_id);
        for source in group_sources(root, default_group_id)? {
            let group = harvest_group(&source, algorithms)?;
            inventory.add_group(group);
        }
        inventory.validate()?;
        Ok(inventory)
    }
}

/// Partition the root into group sources (see module docs)
fn group_sources(root: &Path, default_group_id: &str) -> Result<Vec<GroupSource>> {
    let mut sources = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            sources.push(GroupSource {
                group_id: entry.file_name().to_string_lossy().into_owned(),
                source: entry.path(),
            });
        }
    }
    if sources.is_empty() {
        sources.push(GroupSource {
            group_id: default_group_id.to_string(),
            source: root.to_path_buf(),
        });
    }
    // Deterministic before the inventory applies its own canonical order
    sources.sort_by(|a, b| a.group_id.cmp(&b.group_id));
    Ok(sources)
}

/// Harvest one group: walk, sort, hash in parallel, merge in order
fn harvest_group(source: &GroupSource, algorithms: &[ChecksumAlgorithm]) -> Result<FileGroup> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(&source.source).follow_links(false) {
        let entry = entry.map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(&source.source)
                .map_err(|e| Error::malformed(e.to_string()))?;
            files.push((unix_path(relative), entry.path().to_path_buf()));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let signed: Vec<(String, FileSignature, DateTime<Utc>)> = files
        .par_iter()
        .map(|(relative, absolute)| {
            let signature = FileSignature::from_file(absolute, algorithms)?;
            let modified = std::fs::metadata(absolute)?.modified()?;
            let datetime = DateTime::<Utc>::from(modified).trunc_subsecs(0);
            Ok((relative.clone(), signature, datetime))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut group = FileGroup::new(
        source.group_id.clone(),
        source.source.to_string_lossy().into_owned(),
    );
    let mut index = SignatureIndex::new();
    for (relative, signature, datetime) in signed {
        group.add_instance(&mut index, signature, FileInstance::new(relative, datetime));
    }
    Ok(group)
}

/// Render a relative path with '/' separators on every platform
fn unix_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
