//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{KvError, Result};

use super::record::{encode_record, OP_DEL, OP_PUT};

/// Writes records to the WAL file.
///
/// Every append is fsynced before it returns: callers rely on a returned
/// `Ok` meaning the record survives process termination. The engine
/// serializes appends behind a mutex, which also fixes the order of durable
/// records to match the order of memtable updates.
///
/// Two layers of buffering stand between a write and the platter:
///   BufWriter.flush()  → Rust buffer → OS page cache
///   file.sync_all()    → OS page cache → physical disk
pub struct WalWriter {
    /// `None` once closed; appends then report `WAL_NOT_OPEN`.
    file: Option<BufWriter<File>>,
}

impl WalWriter {
    /// Open the log at `path` in append mode, creating it if missing.
    ///
    /// Existing records are preserved — recovery reads them before this
    /// writer adds more. Never truncates on open.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(WalWriter {
            file: Some(BufWriter::new(file)),
        })
    }

    /// Append a PUT record. Returns after the record is fsynced.
    pub fn append_put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.append_bytes(&encode_record(OP_PUT, key, value))
    }

    /// Append a DEL record. Returns after the record is fsynced.
    pub fn append_del(&mut self, key: &[u8]) -> Result<()> {
        self.append_bytes(&encode_record(OP_DEL, key, &[]))
    }

    fn append_bytes(&mut self, record: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or(KvError::WalNotOpen)?;

        file.write_all(record).map_err(KvError::WalAppend)?;
        file.flush().map_err(KvError::WalAppend)?;
        file.get_ref().sync_all().map_err(KvError::WalAppend)?;

        Ok(())
    }

    /// Force fsync to disk.
    pub fn sync(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or(KvError::WalNotOpen)?;

        file.flush()?;
        file.get_ref().sync_all()?;

        Ok(())
    }

    /// Drop every record.
    ///
    /// Called at flush commit only, after the flushed segment is fsynced and
    /// registered; the records dropped are exactly the ones the new segment
    /// now holds.
    pub fn truncate(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or(KvError::WalNotOpen)?;

        file.flush()?;
        let inner = file.get_mut();
        inner.set_len(0)?;
        inner.sync_all()?;

        Ok(())
    }

    /// Flush, fsync, and close the log. Later appends report `WAL_NOT_OPEN`.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.get_ref().sync_all()?;
        }
        Ok(())
    }

    /// Whether the writer still holds an open file.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}
