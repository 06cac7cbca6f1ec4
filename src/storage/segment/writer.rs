//! Segment Writer
//!
//! Writes a memtable snapshot (or a compaction merge) out as a new segment
//! file: create/truncate, records, fsync, close.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{KvError, Result};
use crate::memtable::MemTableEntry;

use super::TOMBSTONE_MARKER;

/// Builder for a new segment file
#[derive(Debug)]
pub struct SegmentWriter {
    writer: BufWriter<File>,
}

impl SegmentWriter {
    /// Create or truncate the segment file at `path`
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(KvError::SegmentOpenFailed)?;

        Ok(SegmentWriter {
            writer: BufWriter::new(file),
        })
    }

    /// Append one record. Entry order is not part of the format.
    pub fn add(&mut self, key: &[u8], entry: &MemTableEntry) -> Result<()> {
        self.write_record(key, entry)
            .map_err(KvError::SegmentWriteFailed)
    }

    fn write_record(&mut self, key: &[u8], entry: &MemTableEntry) -> io::Result<()> {
        let (vlen, value): (u32, &[u8]) = match entry {
            MemTableEntry::Value(v) => (v.len() as u32, v),
            MemTableEntry::Tombstone => (TOMBSTONE_MARKER, &[]),
        };
        let klen = key.len() as u32;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&klen.to_le_bytes());
        hasher.update(&vlen.to_le_bytes());
        hasher.update(key);
        hasher.update(value);
        let crc = hasher.finalize();

        self.writer.write_all(&crc.to_le_bytes())?;
        self.writer.write_all(&klen.to_le_bytes())?;
        self.writer.write_all(&vlen.to_le_bytes())?;
        self.writer.write_all(key)?;
        self.writer.write_all(value)?;

        Ok(())
    }

    /// Flush, fsync, close. The segment may be registered only after this
    /// returns.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush().map_err(KvError::SegmentWriteFailed)?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(KvError::SegmentWriteFailed)?;
        Ok(())
    }
}

/// Write `entries` out as a complete segment file.
pub fn write_segment(path: &Path, entries: &HashMap<Vec<u8>, MemTableEntry>) -> Result<()> {
    let mut writer = SegmentWriter::create(path)?;
    for (key, entry) in entries {
        writer.add(key, entry)?;
    }
    writer.finish()
}
