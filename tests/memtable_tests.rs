//! Tests for the memtable
//!
//! These tests verify:
//! - Insert/get/delete semantics, tombstones included
//! - Record counting (the flush trigger input)
//! - The O(1) take() handoff and restore() after a failed flush

use emberkv::memtable::{MemTable, MemTableEntry};

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_insert_and_get() {
    let memtable = MemTable::new();

    memtable.insert(b"key".to_vec(), b"value".to_vec());

    assert_eq!(
        memtable.get(b"key"),
        Some(MemTableEntry::Value(b"value".to_vec()))
    );
    assert_eq!(memtable.get(b"missing"), None);
}

#[test]
fn test_insert_overwrites() {
    let memtable = MemTable::new();

    memtable.insert(b"key".to_vec(), b"v1".to_vec());
    memtable.insert(b"key".to_vec(), b"v2".to_vec());

    assert_eq!(
        memtable.get(b"key"),
        Some(MemTableEntry::Value(b"v2".to_vec()))
    );
    assert_eq!(memtable.len(), 1);
}

#[test]
fn test_delete_inserts_tombstone() {
    let memtable = MemTable::new();

    memtable.insert(b"key".to_vec(), b"value".to_vec());
    memtable.delete(b"key".to_vec());

    assert_eq!(memtable.get(b"key"), Some(MemTableEntry::Tombstone));
    // The tombstone still occupies a record.
    assert_eq!(memtable.len(), 1);
}

#[test]
fn test_delete_absent_key_still_shadows() {
    let memtable = MemTable::new();

    // Deleting a key that only exists in a segment must leave a marker.
    memtable.delete(b"flushed".to_vec());

    assert_eq!(memtable.get(b"flushed"), Some(MemTableEntry::Tombstone));
}

#[test]
fn test_len_and_is_empty() {
    let memtable = MemTable::new();
    assert!(memtable.is_empty());

    for i in 0..10 {
        memtable.insert(format!("k{i}").into_bytes(), b"v".to_vec());
    }
    assert_eq!(memtable.len(), 10);
    assert!(!memtable.is_empty());
}

// =============================================================================
// Flush Handoff
// =============================================================================

#[test]
fn test_take_empties_table() {
    let memtable = MemTable::new();
    memtable.insert(b"a".to_vec(), b"1".to_vec());
    memtable.delete(b"b".to_vec());

    let snapshot = memtable.take();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(
        snapshot.get(&b"a"[..]),
        Some(&MemTableEntry::Value(b"1".to_vec()))
    );
    assert_eq!(snapshot.get(&b"b"[..]), Some(&MemTableEntry::Tombstone));
    assert!(memtable.is_empty());
}

#[test]
fn test_restore_newer_entries_win() {
    let memtable = MemTable::new();
    memtable.insert(b"a".to_vec(), b"old".to_vec());
    memtable.insert(b"b".to_vec(), b"kept".to_vec());

    let snapshot = memtable.take();

    // A write lands after the snapshot was taken, then the flush fails.
    memtable.insert(b"a".to_vec(), b"new".to_vec());
    memtable.restore(snapshot);

    assert_eq!(
        memtable.get(b"a"),
        Some(MemTableEntry::Value(b"new".to_vec()))
    );
    assert_eq!(
        memtable.get(b"b"),
        Some(MemTableEntry::Value(b"kept".to_vec()))
    );
}
