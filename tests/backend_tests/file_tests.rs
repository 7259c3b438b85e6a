//! Tests for the single-file backend
//!
//! These tests verify:
//! - Round trip through commit and reopen
//! - Line wrapping of written sequences
//! - Duplicate headers (first occurrence wins)
//! - No-op commits leave the file untouched
//! - Stale index detection and header verification

use std::fs;
use std::path::{Path, PathBuf};

use seqstore::{FileStore, SeqError, StorageConfig};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn fasta_path(dir: &TempDir) -> PathBuf {
    dir.path().join("records.fasta")
}

fn open_store(path: &Path) -> FileStore {
    FileStore::open(path, StorageConfig::default()).unwrap()
}

fn headers_of(store: &mut FileStore) -> Vec<String> {
    store.headers().unwrap().map(str::to_owned).collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);

    let mut store = open_store(&path);

    assert!(path.exists());
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_open_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nACGT\nACGT\n>b desc\nTTTT\n").unwrap();

    let mut store = open_store(&path);

    assert_eq!(headers_of(&mut store), vec!["a", "b desc"]);
    assert_eq!(store.get("a").unwrap(), "ACGTACGT");
    assert_eq!(store.get("b desc").unwrap(), "TTTT");
}

#[test]
fn test_index_built_lazily() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nACGT\n").unwrap();

    let mut store = open_store(&path);
    assert!(store.backend().is_index_stale());

    store.contains("a").unwrap();
    assert!(!store.backend().is_index_stale());
}

// =============================================================================
// Commit Tests
// =============================================================================

#[test]
fn test_commit_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);

    {
        let mut store = open_store(&path);
        store.set("seq1", "ACGT");
        store.set("seq2", "GGCC");
        store.commit().unwrap();
    }

    let mut store = open_store(&path);
    assert_eq!(headers_of(&mut store), vec!["seq1", "seq2"]);
    assert_eq!(store.get("seq1").unwrap(), "ACGT");
    assert_eq!(store.get("seq2").unwrap(), "GGCC");
}

#[test]
fn test_commit_writes_unwrapped_by_default() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);

    let mut store = open_store(&path);
    store.set("a", "A".repeat(150));
    store.commit().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, format!(">a\n{}\n", "A".repeat(150)));
}

#[test]
fn test_commit_wraps_lines() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    let config = StorageConfig::builder().wrap(60).build();

    let mut store = FileStore::open(&path, config).unwrap();
    store.set("a", "A".repeat(120));
    store.commit().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.lines().all(|line| line.len() <= 60));
    assert_eq!(content.lines().count(), 3);

    let mut reopened = open_store(&path);
    assert_eq!(reopened.get("a").unwrap(), "A".repeat(120));
}

#[test]
fn test_commit_applies_delete_and_update() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nAAAA\n>b\nCCCC\n>c\nGGGG\n").unwrap();

    let mut store = open_store(&path);
    store.delete("a");
    store.set("b", "TTTT");
    store.commit().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        ">c\nGGGG\n>b\nTTTT\n"
    );
    assert!(store.get("a").unwrap_err().is_not_found());
    assert_eq!(store.get("b").unwrap(), "TTTT");
}

#[test]
fn test_commit_without_changes_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    let original = ">a\nAC\nGT\n\n>b\nTT\n";
    fs::write(&path, original).unwrap();

    let mut store = open_store(&path);
    store.get("a").unwrap();
    store.commit().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(!store.backend().is_index_stale());
}

#[test]
fn test_commit_invalidates_index_and_keeps_cache() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nAAAA\n").unwrap();

    let mut store = open_store(&path);
    store.get("a").unwrap();
    store.set("b", "CCCC");
    store.commit().unwrap();

    assert!(store.backend().is_index_stale());
    assert_eq!(store.pending().cache_len(), 1);
    assert!(store.pending().is_clean());
}

#[test]
fn test_commit_leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);

    let mut store = open_store(&path);
    store.set("a", "ACGT");
    store.commit().unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

// =============================================================================
// Index Edge Cases
// =============================================================================

#[test]
fn test_duplicate_header_first_wins() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nAAAA\n>a\nCCCC\n").unwrap();

    let mut store = open_store(&path);

    assert_eq!(headers_of(&mut store), vec!["a"]);
    assert_eq!(store.get("a").unwrap(), "AAAA");

    // The duplicate disappears on the next rewrite
    store.set("b", "GG");
    store.commit().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), ">a\nAAAA\n>b\nGG\n");
}

#[test]
fn test_header_mismatch_reads_as_absent() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nAAAA\n>b\nCCCC\n").unwrap();

    let mut store = open_store(&path);
    assert!(store.contains("b").unwrap());

    // Same byte layout, swapped records: "b" now points at ">a"
    fs::write(&path, ">b\nCCCC\n>a\nAAAA\n").unwrap();

    assert!(store.get("b").unwrap_err().is_not_found());
}

#[test]
fn test_stale_offset_on_sequence_line_is_error() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">a\nAAAA\n>b\nCCCC\n").unwrap();

    let mut store = open_store(&path);
    assert!(store.contains("b").unwrap());

    fs::write(&path, ">a\nAAAAAAAA\n>b\nCCCC\n").unwrap();

    assert!(matches!(store.get("b"), Err(SeqError::InvalidHeader(_))));
}

#[test]
fn test_items_follow_file_order() {
    let dir = TempDir::new().unwrap();
    let path = fasta_path(&dir);
    fs::write(&path, ">x\nA\n>y\nC\n>z\nG\n").unwrap();

    let mut store = open_store(&path);
    store.set("y", "T");

    let items: Vec<(String, String)> = store
        .items()
        .unwrap()
        .map(|record| record.unwrap().into_pair())
        .collect();

    assert_eq!(
        items,
        vec![
            ("x".to_string(), "A".to_string()),
            ("z".to_string(), "G".to_string()),
            ("y".to_string(), "T".to_string()),
        ]
    );
}
