//! Segment Store
//!
//! The registry of live segments: an ordered list in registration order,
//! so the last entry is the newest epoch on disk.
//!
//! ## Concurrency
//! - `registry`: exclusive mutex held only for list mutations and copies;
//!   never across file I/O. Readers copy the list under the lock and scan
//!   the copy outside it.
//! - `next_id`: atomic counter (lock-free), seeded from the highest id
//!   found on disk. Filenames are not dense across compactions; the on-disk
//!   contract only requires uniqueness.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::Result;
use crate::memtable::MemTableEntry;

use super::segment;

/// Tracks the live segment files
pub struct SegmentStore {
    /// Directory where segments are stored
    dir: PathBuf,

    /// Live segment paths in registration order (newest last)
    registry: Mutex<Vec<PathBuf>>,

    /// Next id for creating new segments
    next_id: AtomicU64,
}

impl SegmentStore {
    /// Open or create the segments directory and discover live segments.
    ///
    /// Ids are allocated monotonically, so ascending id order reproduces
    /// the original registration order. Files that do not parse as
    /// `seg_<N>.sst` are ignored.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut ids: Vec<u64> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(id) = segment::parse_segment_id(&path) {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();

        let next_id = ids.last().map(|id| id + 1).unwrap_or(0);
        let registry: Vec<PathBuf> = ids
            .iter()
            .map(|id| dir.join(segment::segment_file_name(*id)))
            .collect();

        Ok(SegmentStore {
            dir: dir.to_path_buf(),
            registry: Mutex::new(registry),
            next_id: AtomicU64::new(next_id),
        })
    }

    /// Number of live segments
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    /// Whether any segment is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the live list, newest last.
    ///
    /// Taken under the registry lock; all file I/O happens against the
    /// copy, outside the lock.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.registry.lock().clone()
    }

    /// Reserve the path for the next segment file
    pub fn allocate(&self) -> PathBuf {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.dir.join(segment::segment_file_name(id))
    }

    /// Make a freshly written (and fsynced) segment visible to readers
    pub fn register(&self, path: PathBuf) {
        self.registry.lock().push(path);
    }

    /// Swap the whole registry for a single merged segment, returning the
    /// subsumed paths. The caller unlinks them after this returns — never
    /// before, and never under the lock.
    pub fn replace_all(&self, merged: PathBuf) -> Vec<PathBuf> {
        let mut registry = self.registry.lock();
        std::mem::replace(&mut *registry, vec![merged])
    }

    /// Newest-wins point lookup across live segments.
    ///
    /// A tombstone hit is a definitive answer (the key is deleted), so it
    /// is returned rather than skipped. An unreadable segment counts as
    /// "key not in this segment" and the scan falls through to older ones.
    pub fn find(&self, key: &[u8]) -> Option<MemTableEntry> {
        for path in self.snapshot().iter().rev() {
            match segment::find_in_segment(path, key) {
                Ok(Some(entry)) => return Some(entry),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable segment"
                    );
                    continue;
                }
            }
        }
        None
    }
}
