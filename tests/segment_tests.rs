//! Tests for the segment codec
//!
//! These tests verify:
//! - Round-trip: write a map, read it back identical
//! - Tombstone records
//! - Corruption containment: records before the first bad byte survive,
//!   everything after is dropped, and reads still return Ok
//! - Streaming point lookups
//! - Observable failure reasons

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use emberkv::memtable::MemTableEntry;
use emberkv::storage::segment::{
    find_in_segment, parse_segment_id, read_segment, segment_file_name, write_segment,
    SegmentReader, SegmentWriter, RECORD_HEADER_SIZE,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_segment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("seg_0.sst");
    (temp_dir, path)
}

fn value_map(entries: &[(&[u8], &[u8])]) -> HashMap<Vec<u8>, MemTableEntry> {
    entries
        .iter()
        .map(|(k, v)| (k.to_vec(), MemTableEntry::Value(v.to_vec())))
        .collect()
}

fn record_len(key: &[u8], value: &[u8]) -> usize {
    RECORD_HEADER_SIZE + key.len() + value.len()
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_round_trip() {
    let (_temp, path) = setup_temp_segment();

    let map = value_map(&[
        (b"apple", b"red"),
        (b"banana", b"yellow"),
        (b"cherry", b"red"),
    ]);
    write_segment(&path, &map).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert_eq!(out, map);
}

#[test]
fn test_round_trip_many_entries() {
    let (_temp, path) = setup_temp_segment();

    let mut map = HashMap::new();
    for i in 0..1000 {
        map.insert(
            format!("key{i:04}").into_bytes(),
            MemTableEntry::Value(format!("value{i}").into_bytes()),
        );
    }
    write_segment(&path, &map).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert_eq!(out, map);
}

#[test]
fn test_empty_value_round_trip() {
    let (_temp, path) = setup_temp_segment();

    let map = value_map(&[(b"key", b"")]);
    write_segment(&path, &map).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert_eq!(out, map);
}

#[test]
fn test_tombstone_round_trip() {
    let (_temp, path) = setup_temp_segment();

    let mut map = value_map(&[(b"live", b"v")]);
    map.insert(b"dead".to_vec(), MemTableEntry::Tombstone);
    write_segment(&path, &map).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert_eq!(out, map);
}

#[test]
fn test_empty_segment() {
    let (_temp, path) = setup_temp_segment();

    write_segment(&path, &HashMap::new()).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert!(out.is_empty());
}

// =============================================================================
// Corruption Containment Tests
// =============================================================================

#[test]
fn test_corruption_drops_tail_keeps_prefix() {
    let (_temp, path) = setup_temp_segment();

    // Write records in a known order to control where the corruption lands.
    let mut writer = SegmentWriter::create(&path).unwrap();
    writer.add(b"k1", &MemTableEntry::Value(b"v1".to_vec())).unwrap();
    writer.add(b"k2", &MemTableEntry::Value(b"v2".to_vec())).unwrap();
    writer.add(b"k3", &MemTableEntry::Value(b"v3".to_vec())).unwrap();
    writer.finish().unwrap();

    // Flip a payload byte in the middle record.
    let mut bytes = fs::read(&path).unwrap();
    let offset = record_len(b"k1", b"v1") + RECORD_HEADER_SIZE;
    bytes[offset] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.get(&b"k1"[..]), Some(&MemTableEntry::Value(b"v1".to_vec())));
}

#[test]
fn test_corrupt_leading_record_empties_segment() {
    let (_temp, path) = setup_temp_segment();

    let map = value_map(&[(b"k1", b"v1"), (b"k2", b"v2")]);
    write_segment(&path, &map).unwrap();

    // Stomp the first record's CRC; trailing truncation drops everything.
    let mut bytes = fs::read(&path).unwrap();
    bytes[0..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    fs::write(&path, &bytes).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_truncated_tail_record() {
    let (_temp, path) = setup_temp_segment();

    let mut writer = SegmentWriter::create(&path).unwrap();
    writer.add(b"k1", &MemTableEntry::Value(b"v1".to_vec())).unwrap();
    writer.add(b"k2", &MemTableEntry::Value(b"v2".to_vec())).unwrap();
    writer.finish().unwrap();

    // Shear off the last few bytes, as a torn write would.
    let full = fs::metadata(&path).unwrap().len();
    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(full - 3).unwrap();

    let mut reader = SegmentReader::open(&path).unwrap();
    let records: Vec<_> = reader.by_ref().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, b"k1");
    assert!(reader.truncated());
}

#[test]
fn test_trailing_garbage_is_ignored() {
    let (_temp, path) = setup_temp_segment();

    let map = value_map(&[(b"k", b"v")]);
    write_segment(&path, &map).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes.extend_from_slice(b"garbage");
    fs::write(&path, &bytes).unwrap();

    let mut out = HashMap::new();
    read_segment(&path, &mut out).unwrap();
    assert_eq!(out, map);
}

// =============================================================================
// Point Lookup Tests
// =============================================================================

#[test]
fn test_find_in_segment() {
    let (_temp, path) = setup_temp_segment();

    let mut map = value_map(&[(b"k1", b"v1"), (b"k2", b"v2")]);
    map.insert(b"gone".to_vec(), MemTableEntry::Tombstone);
    write_segment(&path, &map).unwrap();

    assert_eq!(
        find_in_segment(&path, b"k2").unwrap(),
        Some(MemTableEntry::Value(b"v2".to_vec()))
    );
    assert_eq!(
        find_in_segment(&path, b"gone").unwrap(),
        Some(MemTableEntry::Tombstone)
    );
    assert_eq!(find_in_segment(&path, b"missing").unwrap(), None);
}

// =============================================================================
// Failure Reason Tests
// =============================================================================

#[test]
fn test_open_missing_segment_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does_not_exist.sst");

    let err = SegmentReader::open(&path).unwrap_err();
    assert_eq!(err.reason(), "SEGMENT_OPEN_FAILED");

    let err = find_in_segment(&path, b"k").unwrap_err();
    assert_eq!(err.reason(), "SEGMENT_OPEN_FAILED");
}

#[test]
fn test_create_over_directory_fails() {
    let temp_dir = TempDir::new().unwrap();

    // The target path is an existing directory; open must fail.
    let err = SegmentWriter::create(temp_dir.path()).unwrap_err();
    assert_eq!(err.reason(), "SEGMENT_OPEN_FAILED");
}

// =============================================================================
// Naming Tests
// =============================================================================

#[test]
fn test_segment_file_names() {
    assert_eq!(segment_file_name(0), "seg_0.sst");
    assert_eq!(segment_file_name(42), "seg_42.sst");

    assert_eq!(parse_segment_id(&PathBuf::from("seg_42.sst")), Some(42));
    assert_eq!(parse_segment_id(&PathBuf::from("/data/seg_7.sst")), Some(7));
    assert_eq!(parse_segment_id(&PathBuf::from("seg_abc.sst")), None);
    assert_eq!(parse_segment_id(&PathBuf::from("other_1.sst")), None);
    assert_eq!(parse_segment_id(&PathBuf::from("seg_1.txt")), None);
}
