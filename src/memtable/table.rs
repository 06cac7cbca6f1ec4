//! MemTable implementation
//!
//! HashMap-based memtable with RwLock for concurrency.
//! Uses parking_lot::RwLock which never poisons on panic.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::MemTableEntry;

/// In-memory table for the current write epoch
pub struct MemTable {
    data: RwLock<HashMap<Vec<u8>, MemTableEntry>>,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        MemTable {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Get the entry for a key (read lock)
    ///
    /// `Some(Tombstone)` means the key was deleted in this epoch and older
    /// epochs must not be consulted.
    pub fn get(&self, key: &[u8]) -> Option<MemTableEntry> {
        let data = self.data.read();
        data.get(key).cloned()
    }

    /// Insert a key-value pair (write lock)
    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>) {
        let mut data = self.data.write();
        data.insert(key, MemTableEntry::Value(value));
    }

    /// Delete a key (write lock, inserts a tombstone)
    pub fn delete(&self, key: Vec<u8>) {
        let mut data = self.data.write();
        data.insert(key, MemTableEntry::Tombstone);
    }

    /// Record count, tombstones included
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the whole table out, leaving it empty.
    ///
    /// This is the flush handoff: an O(1) swap under the write lock, so
    /// readers are never blocked behind segment I/O.
    pub fn take(&self) -> HashMap<Vec<u8>, MemTableEntry> {
        let mut data = self.data.write();
        std::mem::take(&mut *data)
    }

    /// Merge a snapshot back after a failed flush.
    ///
    /// Entries written since the snapshot was taken win over the snapshot.
    pub fn restore(&self, snapshot: HashMap<Vec<u8>, MemTableEntry>) {
        let mut data = self.data.write();
        for (key, entry) in snapshot {
            data.entry(key).or_insert(entry);
        }
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
