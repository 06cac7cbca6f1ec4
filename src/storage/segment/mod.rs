//! Segment files — immutable on-disk snapshots of past memtable epochs.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Record 1                                        │
//! │ ┌─────────┬──────────┬──────────┬─────┬───────┐ │
//! │ │ CRC (4) │ KLen (4) │ VLen (4) │ Key │ Value │ │
//! │ └─────────┴──────────┴──────────┴─────┴───────┘ │
//! ├─────────────────────────────────────────────────┤
//! │ Record 2 ...                                    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! All integers little-endian, packed, no padding. The CRC covers
//! `{klen, vlen, key, value}` and not itself. `VLen == u32::MAX` marks a
//! tombstone and no value bytes follow.
//!
//! Record order within a segment carries no meaning: readers merge records
//! into a map, and a segment holds each key at most once (it is materialized
//! from one). Corruption anywhere prunes the tail of that segment — the
//! first short read, bogus length, or CRC mismatch is treated as end of
//! file, and everything before it stays readable.

mod reader;
mod writer;

use std::path::Path;

pub use reader::{find_in_segment, read_segment, SegmentReader};
pub use writer::{write_segment, SegmentWriter};

/// Fixed part of a record: CRC (4) + key len (4) + value len (4).
pub const RECORD_HEADER_SIZE: usize = 12;

/// `VLen` sentinel marking a tombstone. Representable because real values
/// are capped below `u32::MAX` bytes.
pub(crate) const TOMBSTONE_MARKER: u32 = u32::MAX;

/// File name for segment `id`.
pub fn segment_file_name(id: u64) -> String {
    format!("seg_{id}.sst")
}

/// Parse a segment id back out of a file name.
/// `seg_42.sst` → `Some(42)`; anything else → `None`.
pub fn parse_segment_id(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix("seg_")?.strip_suffix(".sst")?;
    id.parse().ok()
}
