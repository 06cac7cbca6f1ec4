//! Segment Reader
//!
//! Streaming decode with the trailing-truncation policy shared with the
//! WAL reader: the first malformed record ends the file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{KvError, Result};
use crate::memtable::MemTableEntry;

use super::{RECORD_HEADER_SIZE, TOMBSTONE_MARKER};

/// Streams records out of one segment file
#[derive(Debug)]
pub struct SegmentReader {
    reader: BufReader<File>,
    /// Bytes left in the file; lengths are validated against this before
    /// any payload allocation.
    remaining: u64,
    truncated: bool,
}

impl SegmentReader {
    /// Open a segment for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(KvError::SegmentOpenFailed)?;
        let remaining = file
            .metadata()
            .map_err(KvError::SegmentOpenFailed)?
            .len();

        Ok(SegmentReader {
            reader: BufReader::new(file),
            remaining,
            truncated: false,
        })
    }

    /// Next well-formed record, or `None` at end of file or at the first
    /// malformed record.
    pub fn next_record(&mut self) -> Option<(Vec<u8>, MemTableEntry)> {
        if self.remaining == 0 {
            return None;
        }
        if self.remaining < RECORD_HEADER_SIZE as u64 {
            return self.stop();
        }

        let mut header = [0u8; RECORD_HEADER_SIZE];
        if self.reader.read_exact(&mut header).is_err() {
            return self.stop();
        }
        self.remaining -= RECORD_HEADER_SIZE as u64;

        let stored_crc = u32::from_le_bytes(header[0..4].try_into().unwrap());
        let klen = u32::from_le_bytes(header[4..8].try_into().unwrap()) as u64;
        let vlen_raw = u32::from_le_bytes(header[8..12].try_into().unwrap());

        let tombstone = vlen_raw == TOMBSTONE_MARKER;
        let vlen = if tombstone { 0 } else { vlen_raw as u64 };

        if klen == 0 || klen + vlen > self.remaining {
            return self.stop();
        }

        let mut payload = vec![0u8; (klen + vlen) as usize];
        if self.reader.read_exact(&mut payload).is_err() {
            return self.stop();
        }
        self.remaining -= klen + vlen;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header[4..]);
        hasher.update(&payload);
        if hasher.finalize() != stored_crc {
            return self.stop();
        }

        let key = payload[..klen as usize].to_vec();
        let entry = if tombstone {
            MemTableEntry::Tombstone
        } else {
            MemTableEntry::Value(payload[klen as usize..].to_vec())
        };

        Some((key, entry))
    }

    /// True when the file ended in a malformed record and the tail past it
    /// was discarded.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn stop(&mut self) -> Option<(Vec<u8>, MemTableEntry)> {
        self.truncated = true;
        self.remaining = 0;
        None
    }
}

impl Iterator for SegmentReader {
    type Item = (Vec<u8>, MemTableEntry);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Merge every valid record into `out`; later records overwrite earlier
/// ones, so reading segments oldest to newest yields newest-wins.
///
/// Corruption prunes the tail: whatever decoded before it is kept and the
/// call still returns `Ok`. Only a failure to open the file is an error.
pub fn read_segment(path: &Path, out: &mut HashMap<Vec<u8>, MemTableEntry>) -> Result<()> {
    let mut reader = SegmentReader::open(path)?;
    while let Some((key, entry)) = reader.next_record() {
        out.insert(key, entry);
    }
    if reader.truncated() {
        tracing::warn!(
            path = %path.display(),
            "segment has a corrupt tail; keeping the valid prefix"
        );
    }
    Ok(())
}

/// Streaming point lookup with the same termination rule.
///
/// A segment holds each key at most once, so the first match is the record.
/// `Ok(None)` means "not in this segment".
pub fn find_in_segment(path: &Path, key: &[u8]) -> Result<Option<MemTableEntry>> {
    let mut reader = SegmentReader::open(path)?;
    while let Some((k, entry)) = reader.next_record() {
        if k == key {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}
