//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and segment store
//! - Handle concurrent read/write access
//! - Trigger flushes when the memtable is full and compactions when the
//!   segment count crosses the threshold
//! - Replay the WAL on startup
//!
//! ## Locking
//! Three locks, acquired in the order WAL → memtable → registry and never
//! upward:
//! - memtable RwLock (inside [`MemTable`]): shared for gets, exclusive for
//!   updates and for the O(1) swap at flush start
//! - WAL mutex: serializes appends; fsync happens inside the critical
//!   section so durable order matches the order reads observe
//! - registry mutex (inside [`SegmentStore`]): held only for list
//!   mutations, never across file I/O

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::memtable::{MemTable, MemTableEntry};
use crate::storage::{segment, SegmentStore};
use crate::wal::{replay, WalWriter};

/// The main storage engine
pub struct Engine {
    config: Config,
    wal: Mutex<WalWriter>,
    memtable: MemTable,
    store: SegmentStore,
}

impl Engine {
    /// Open or create an engine rooted at `config.data_dir`.
    ///
    /// On startup:
    /// 1. Create the `wal/` and `segments/` subdirectories
    /// 2. Discover existing segments
    /// 3. Replay the WAL into a fresh memtable
    /// 4. Reopen the WAL for appending (never truncated on open)
    pub fn open(config: Config) -> Result<Self> {
        let wal_dir = config.data_dir.join("wal");
        fs::create_dir_all(&wal_dir)?;
        let wal_path = wal_dir.join("kv.wal");

        let store = SegmentStore::open(&config.data_dir.join("segments"))?;

        let memtable = MemTable::new();
        let stats = replay(&wal_path, &memtable)?;
        tracing::info!(
            records = stats.records_applied,
            puts = stats.puts,
            dels = stats.dels,
            tail_truncated = stats.tail_truncated,
            segments = store.len(),
            "engine opened"
        );

        let wal = WalWriter::open(&wal_path)?;

        Ok(Engine {
            config,
            wal: Mutex::new(wal),
            memtable,
            store,
        })
    }

    /// Open with defaults at `path` (convenience method)
    pub fn open_path(path: &Path) -> Result<Self> {
        Engine::open(Config::builder().data_dir(path).build())
    }

    /// Put a key-value pair.
    ///
    /// The record is fsynced in the WAL before the memtable is touched and
    /// before this returns; a WAL failure leaves the memtable unchanged.
    ///
    /// The WAL mutex stays held across the memtable insert: a flush that
    /// wins the mutex in between would truncate the record away while the
    /// value is in neither the snapshot nor the log.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }

        {
            let mut wal = self.wal.lock();
            wal.append_put(key, value)?;
            self.memtable.insert(key.to_vec(), value.to_vec());
        }

        if self.memtable.len() >= self.config.mem_limit {
            self.flush()?;
        }
        Ok(())
    }

    /// Get the value for a key.
    ///
    /// Consults the memtable first, then segments newest to oldest. A
    /// tombstone at any level is a definitive "deleted".
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        match self.memtable.get(key) {
            Some(MemTableEntry::Value(value)) => return Ok(value),
            Some(MemTableEntry::Tombstone) => return Err(KvError::KeyNotFound),
            None => {}
        }

        match self.store.find(key) {
            Some(MemTableEntry::Value(value)) => Ok(value),
            Some(MemTableEntry::Tombstone) | None => Err(KvError::KeyNotFound),
        }
    }

    /// Delete a key.
    ///
    /// Presence is resolved through the same lookup path as [`Engine::get`]
    /// (memtable, then segments), so deleting a key that lives only in a
    /// segment works: a DEL record is logged and a tombstone shadows the
    /// key until compaction retires it. A miss writes nothing and returns
    /// `KEY_NOT_FOUND`.
    pub fn del(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }

        match self.memtable.get(key) {
            Some(MemTableEntry::Value(_)) => {}
            Some(MemTableEntry::Tombstone) => return Err(KvError::KeyNotFound),
            None => match self.store.find(key) {
                Some(MemTableEntry::Value(_)) => {}
                Some(MemTableEntry::Tombstone) | None => return Err(KvError::KeyNotFound),
            },
        }

        {
            let mut wal = self.wal.lock();
            wal.append_del(key)?;
            self.memtable.delete(key.to_vec());
        }

        // Tombstones occupy memtable records, so deletes share the flush
        // trigger with puts.
        if self.memtable.len() >= self.config.mem_limit {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush the memtable into a new segment and truncate the WAL.
    ///
    /// The WAL mutex is held from before the memtable swap until after the
    /// truncation: no append can land between the swap and the truncate, so
    /// the records dropped from the log are exactly the ones the new
    /// segment now holds. Readers are unaffected; writers queue on the WAL
    /// mutex for the duration.
    ///
    /// Commit order: write segment → fsync → register → truncate WAL.
    pub fn flush(&self) -> Result<()> {
        let mut wal = self.wal.lock();

        let snapshot = self.memtable.take();
        if snapshot.is_empty() {
            return Ok(());
        }

        let path = self.store.allocate();
        if let Err(e) = segment::write_segment(&path, &snapshot) {
            // The WAL still holds every record in the snapshot; put the
            // entries back so reads keep working until a retry or restart.
            self.memtable.restore(snapshot);
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        let records = snapshot.len();
        self.store.register(path.clone());
        wal.truncate()?;

        tracing::info!(
            segment = %path.display(),
            records,
            "memtable flushed"
        );

        if self.store.len() >= self.config.compaction_threshold {
            self.compact()?;
        }
        Ok(())
    }

    /// Merge every live segment into one, newest record per key winning.
    ///
    /// Runs with the WAL mutex held (flush is the only caller), so the
    /// registry cannot change underneath the merge. Readers keep resolving
    /// against the old segments until the commit, which is an atomic list
    /// swap; the subsumed files are unlinked only after the swap.
    fn compact(&self) -> Result<()> {
        let live = self.store.snapshot();
        if live.len() < 2 {
            return Ok(());
        }

        let mut merged: HashMap<Vec<u8>, MemTableEntry> = HashMap::new();
        for path in &live {
            // Oldest to newest: later records overwrite earlier ones.
            segment::read_segment(path, &mut merged)?;
        }

        // Every older epoch is part of this merge, so tombstones have
        // nothing left to shadow.
        merged.retain(|_, entry| !matches!(entry, MemTableEntry::Tombstone));

        let path = self.store.allocate();
        if let Err(e) = segment::write_segment(&path, &merged) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        let old = self.store.replace_all(path.clone());
        for stale in &old {
            if let Err(e) = fs::remove_file(stale) {
                tracing::warn!(
                    path = %stale.display(),
                    error = %e,
                    "failed to unlink compacted segment"
                );
            }
        }

        tracing::info!(
            merged_from = old.len(),
            segment = %path.display(),
            records = merged.len(),
            "compaction finished"
        );
        Ok(())
    }

    /// Number of live segments
    pub fn segment_count(&self) -> usize {
        self.store.len()
    }

    /// Records currently in the memtable, tombstones included
    pub fn memtable_len(&self) -> usize {
        self.memtable.len()
    }

    /// Flush what remains and close the WAL.
    pub fn close(self) -> Result<()> {
        self.flush()?;
        self.wal.lock().close()?;
        Ok(())
    }
}
