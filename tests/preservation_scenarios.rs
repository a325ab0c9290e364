/*!
 * End-to-end scenarios over a two-version fixture object.
 *
 * The fixture mirrors a typical page-image deposit: a `content` group of
 * six page images and a `metadata` group of five descriptive documents.
 * Version 2 touches both groups: one page is modified, one renamed, one
 * removed, one added, and two metadata documents are rewritten.
 */

use std::path::Path;
use tempfile::tempdir;

use relic::{
    compare, compare_with_directory, verify_against_directory, ChangeType, ChecksumAlgorithm,
    FileInventory, SignatureCatalog, DEFAULT_ALGORITHMS,
};

const OBJECT_ID: &str = "druid-ab123cd4567";

fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn filler(byte: u8, size: usize) -> Vec<u8> {
    vec![byte; size]
}

/// Version 1: 6 content files + 5 metadata files
fn stage_v1(root: &Path) {
    write_file(root, "content/intro-1.jpg", &filler(b'1', 1200));
    write_file(root, "content/intro-2.jpg", &filler(b'2', 1400));
    write_file(root, "content/page-1.jpg", &filler(b'3', 2100));
    write_file(root, "content/page-2.jpg", &filler(b'4', 2300));
    write_file(root, "content/page-3.jpg", &filler(b'5', 2500));
    write_file(root, "content/title.jpg", &filler(b'6', 900));
    write_file(root, "metadata/contentMetadata.xml", &filler(b'a', 300));
    write_file(root, "metadata/descMetadata.xml", &filler(b'b', 400));
    write_file(root, "metadata/identityMetadata.xml", &filler(b'c', 500));
    write_file(root, "metadata/provenanceMetadata.xml", &filler(b'd', 600));
    write_file(root, "metadata/versionMetadata.xml", &filler(b'e', 700));
}

/// Version 2 relative to version 1:
/// - content: page-1 modified, page-2 renamed to page-2a, page-3 deleted,
///   page-4 added; intro-1, intro-2, title unchanged
/// - metadata: descMetadata and provenanceMetadata modified; rest unchanged
///
/// The four files carrying content new to the catalog (page-1 v2, page-4,
/// descMetadata v2, provenanceMetadata v2) total 35584 bytes and 37
/// 1024-byte blocks.
fn stage_v2(root: &Path) {
    write_file(root, "content/intro-1.jpg", &filler(b'1', 1200));
    write_file(root, "content/intro-2.jpg", &filler(b'2', 1400));
    write_file(root, "content/page-1.jpg", &filler(b'X', 9800));
    write_file(root, "content/page-2a.jpg", &filler(b'4', 2300));
    write_file(root, "content/page-4.jpg", &filler(b'Y', 19700));
    write_file(root, "content/title.jpg", &filler(b'6', 900));
    write_file(root, "metadata/contentMetadata.xml", &filler(b'a', 300));
    write_file(root, "metadata/descMetadata.xml", &filler(b'Z', 5500));
    write_file(root, "metadata/identityMetadata.xml", &filler(b'c', 500));
    write_file(root, "metadata/provenanceMetadata.xml", &filler(b'W', 584));
    write_file(root, "metadata/versionMetadata.xml", &filler(b'e', 700));
}

fn harvest(root: &Path, version_id: u32) -> FileInventory {
    FileInventory::from_directory(root, OBJECT_ID, version_id, &DEFAULT_ALGORITHMS, "content")
        .unwrap()
}

#[test]
fn test_harvest_counts_and_group_order() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());

    let inventory = harvest(staging.path(), 1);

    assert_eq!(inventory.file_count, 11);
    assert_eq!(inventory.group_ids(), vec!["content", "metadata"]);
    assert_eq!(inventory.group("content").unwrap().file_count, 6);
    assert_eq!(inventory.group("metadata").unwrap().file_count, 5);
    assert_eq!(inventory.version_label(), "v1");

    // Every signature carries all three default digests
    for group in &inventory.file_groups {
        for manifestation in &group.files {
            for algorithm in DEFAULT_ALGORITHMS {
                assert!(manifestation.file_signature.digest(algorithm).is_some());
            }
        }
    }
}

#[test]
fn test_two_version_diff_classification() {
    let v1_dir = tempdir().unwrap();
    let v2_dir = tempdir().unwrap();
    stage_v1(v1_dir.path());
    stage_v2(v2_dir.path());

    let v1 = harvest(v1_dir.path(), 1);
    let v2 = harvest(v2_dir.path(), 2);
    let report = compare(&v1, &v2);

    assert_eq!(report.basis, "v1");
    assert_eq!(report.other, "v2");
    assert_eq!(report.group_differences.len(), 2);
    assert_eq!(report.difference_count, 6);

    let content = report.group("content").unwrap();
    assert_eq!(content.count(ChangeType::Identical), 3);
    assert_eq!(content.count(ChangeType::Modified), 1);
    assert_eq!(content.count(ChangeType::Renamed), 1);
    assert_eq!(content.count(ChangeType::Deleted), 1);
    assert_eq!(content.count(ChangeType::Added), 1);
    assert_eq!(content.difference_count, 4);

    let metadata = report.group("metadata").unwrap();
    assert_eq!(metadata.count(ChangeType::Identical), 3);
    assert_eq!(metadata.count(ChangeType::Modified), 2);
    assert_eq!(metadata.difference_count, 2);

    // The rename pairs the old and new path
    let renamed = &content.subset(ChangeType::Renamed).unwrap().file_instance_differences[0];
    assert_eq!(renamed.basis_path.as_deref(), Some("page-2.jpg"));
    assert_eq!(renamed.other_path.as_deref(), Some("page-2a.jpg"));
}

#[test]
fn test_catalog_grows_by_new_signatures_only() {
    let v1_dir = tempdir().unwrap();
    let v2_dir = tempdir().unwrap();
    stage_v1(v1_dir.path());
    stage_v2(v2_dir.path());

    let storage_root = Path::new("/repo").join(OBJECT_ID);
    let mut catalog = SignatureCatalog::new(OBJECT_ID);

    let v1 = harvest(v1_dir.path(), 1);
    assert_eq!(catalog.update(&v1, &storage_root).unwrap(), 11);
    assert_eq!(catalog.entry_count(), 11);

    let v2 = harvest(v2_dir.path(), 2);
    assert_eq!(catalog.update(&v2, &storage_root).unwrap(), 4);
    assert_eq!(catalog.entry_count(), 15);
    assert_eq!(catalog.version_id, 2);

    // Renamed content resolves to its v1 storage path
    let renamed = v2
        .group("content")
        .unwrap()
        .files
        .iter()
        .find(|m| m.paths() == vec!["page-2a.jpg"])
        .unwrap();
    let entry = catalog.entry_for_signature(&renamed.file_signature).unwrap();
    assert_eq!(entry.original_version, 1);
    assert_eq!(entry.storage_path, "v0001/data/content/page-2.jpg");
}

#[test]
fn test_version_additions_aggregate_counts() {
    let v1_dir = tempdir().unwrap();
    let v2_dir = tempdir().unwrap();
    stage_v1(v1_dir.path());
    stage_v2(v2_dir.path());

    let storage_root = Path::new("/repo").join(OBJECT_ID);
    let mut catalog = SignatureCatalog::new(OBJECT_ID);
    catalog.update(&harvest(v1_dir.path(), 1), &storage_root).unwrap();

    let v2 = harvest(v2_dir.path(), 2);
    let additions = catalog.version_additions(&v2);

    assert_eq!(additions.file_count, 4);
    assert_eq!(additions.byte_count, 35584);
    assert_eq!(additions.block_count, 37);
    assert_eq!(additions.group_ids(), vec!["content", "metadata"]);
    assert_eq!(additions.group("content").unwrap().file_count, 2);
    assert_eq!(additions.group("metadata").unwrap().file_count, 2);

    // Dry run: the catalog itself is untouched
    assert_eq!(catalog.entry_count(), 11);
}

#[test]
fn test_verify_unchanged_directory() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());

    let inventory = harvest(staging.path(), 1);
    let report = compare_with_directory(
        &inventory,
        staging.path(),
        &DEFAULT_ALGORITHMS,
        "content",
    )
    .unwrap();

    assert_eq!(report.difference_count, 0);
    assert!(!report.other.is_empty());
    assert_eq!(
        report.other,
        staging.path().file_name().unwrap().to_string_lossy().to_string()
    );
    assert!(
        verify_against_directory(&inventory, staging.path(), &DEFAULT_ALGORITHMS, "content")
            .unwrap()
    );
}

#[test]
fn test_verify_detects_tampering() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());
    let inventory = harvest(staging.path(), 1);

    write_file(staging.path(), "content/page-1.jpg", b"tampered");

    assert!(
        !verify_against_directory(&inventory, staging.path(), &DEFAULT_ALGORITHMS, "content")
            .unwrap()
    );
}

#[test]
fn test_inventory_document_round_trip() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());
    let inventory = harvest(staging.path(), 1);

    let dir = tempdir().unwrap();
    let path = dir.path().join("versionInventory.json");
    inventory.save(&path).unwrap();
    let loaded = FileInventory::load(&path).unwrap();

    assert_eq!(loaded, inventory);
    assert_eq!(loaded.group_ids(), vec!["content", "metadata"]);
}

#[test]
fn test_catalog_document_round_trip() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());

    let storage_root = Path::new("/repo").join(OBJECT_ID);
    let mut catalog = SignatureCatalog::new(OBJECT_ID);
    catalog.update(&harvest(staging.path(), 1), &storage_root).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("signatureCatalog.json");
    catalog.save(&path).unwrap();
    let loaded = SignatureCatalog::load(&path).unwrap();

    assert_eq!(loaded, catalog);
    assert_eq!(loaded.entry_count(), 11);
}

#[test]
fn test_catalog_update_is_idempotent_over_harvests() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());

    let storage_root = Path::new("/repo").join(OBJECT_ID);
    let mut catalog = SignatureCatalog::new(OBJECT_ID);
    let inventory = harvest(staging.path(), 1);

    assert_eq!(catalog.update(&inventory, &storage_root).unwrap(), 11);
    assert_eq!(catalog.update(&inventory, &storage_root).unwrap(), 0);
    assert_eq!(catalog.entry_count(), 11);
}

#[test]
fn test_every_manifestation_has_exactly_one_entry() {
    let v1_dir = tempdir().unwrap();
    let v2_dir = tempdir().unwrap();
    stage_v1(v1_dir.path());
    stage_v2(v2_dir.path());

    let storage_root = Path::new("/repo").join(OBJECT_ID);
    let mut catalog = SignatureCatalog::new(OBJECT_ID);
    let v1 = harvest(v1_dir.path(), 1);
    let v2 = harvest(v2_dir.path(), 2);
    catalog.update(&v1, &storage_root).unwrap();
    catalog.update(&v2, &storage_root).unwrap();

    for inventory in [&v1, &v2] {
        for group in &inventory.file_groups {
            for manifestation in &group.files {
                let matching = catalog
                    .entries
                    .iter()
                    .filter(|e| e.file_signature.matches(&manifestation.file_signature))
                    .count();
                assert_eq!(matching, 1, "paths {:?}", manifestation.paths());
            }
        }
    }
}

#[test]
fn test_diff_role_swap() {
    let v1_dir = tempdir().unwrap();
    let v2_dir = tempdir().unwrap();
    stage_v1(v1_dir.path());
    stage_v2(v2_dir.path());

    let v1 = harvest(v1_dir.path(), 1);
    let v2 = harvest(v2_dir.path(), 2);
    let forward = compare(&v1, &v2);
    let backward = compare(&v2, &v1);

    assert_eq!(forward.difference_count, backward.difference_count);
    assert_eq!(
        forward.count(ChangeType::Added),
        backward.count(ChangeType::Deleted)
    );
    assert_eq!(
        forward.count(ChangeType::Deleted),
        backward.count(ChangeType::Added)
    );
    assert_eq!(
        forward.count(ChangeType::Identical),
        backward.count(ChangeType::Identical)
    );

    let added_paths: Vec<_> = forward
        .group("content")
        .unwrap()
        .subset(ChangeType::Added)
        .unwrap()
        .file_instance_differences
        .iter()
        .map(|d| d.other_path.clone().unwrap())
        .collect();
    let deleted_paths: Vec<_> = backward
        .group("content")
        .unwrap()
        .subset(ChangeType::Deleted)
        .unwrap()
        .file_instance_differences
        .iter()
        .map(|d| d.basis_path.clone().unwrap())
        .collect();
    assert_eq!(added_paths, deleted_paths);
}

#[test]
fn test_diff_classifies_every_file_exactly_once() {
    let v1_dir = tempdir().unwrap();
    let v2_dir = tempdir().unwrap();
    stage_v1(v1_dir.path());
    stage_v2(v2_dir.path());

    let report = compare(&harvest(v1_dir.path(), 1), &harvest(v2_dir.path(), 2));

    // 3 + 3 identical, 1 + 2 modified, 1 renamed, 1 deleted, 1 added
    let total: u64 = report
        .group_differences
        .iter()
        .map(|g| g.total_file_count())
        .sum();
    assert_eq!(total, 12);
}

#[test]
fn test_subset_of_algorithms_is_sufficient() {
    let staging = tempdir().unwrap();
    stage_v1(staging.path());

    let algorithms = [ChecksumAlgorithm::Sha256];
    let inventory = FileInventory::from_directory(
        staging.path(),
        OBJECT_ID,
        1,
        &algorithms,
        "content",
    )
    .unwrap();

    assert_eq!(inventory.file_count, 11);
    let sig = &inventory.group("content").unwrap().files[0].file_signature;
    assert!(sig.digest(ChecksumAlgorithm::Sha256).is_some());
    assert!(sig.digest(ChecksumAlgorithm::Md5).is_none());
}
