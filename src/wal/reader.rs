//! WAL Reader
//!
//! Streaming decode of WAL records with the trailing-truncation policy:
//! the first short read, bogus length, or CRC mismatch ends the log. A
//! torn write from a crash produces exactly that pattern, so the surviving
//! prefix is the durable one.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::Result;

use super::record::{Operation, OP_DEL, OP_PUT, RECORD_HEADER_SIZE};

/// Reads records from a WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Bytes left in the file; lengths are validated against this before
    /// any payload allocation.
    remaining: u64,
    truncated: bool,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let remaining = file.metadata()?.len();

        Ok(WalReader {
            reader: BufReader::new(file),
            remaining,
            truncated: false,
        })
    }

    /// Read the next well-formed record.
    ///
    /// Returns `None` at end of file or at the first malformed record;
    /// [`WalReader::truncated`] tells the two apart.
    pub fn next_record(&mut self) -> Option<Operation> {
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
        let tag = header[4];
        let klen = u32::from_le_bytes(header[5..9].try_into().unwrap()) as u64;
        let vlen = u32::from_le_bytes(header[9..13].try_into().unwrap()) as u64;

        // A corrupt header cannot be resynchronized past; keys are never
        // empty and lengths never reach beyond the file.
        if (tag != OP_PUT && tag != OP_DEL) || klen == 0 || klen + vlen > self.remaining {
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
        match tag {
            OP_PUT => Some(Operation::Put {
                key,
                value: payload[klen as usize..].to_vec(),
            }),
            _ => Some(Operation::Delete { key }),
        }
    }

    /// True when the log ended in a partial or corrupt record and the tail
    /// past it was discarded.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn stop(&mut self) -> Option<Operation> {
        self.truncated = true;
        self.remaining = 0;
        None
    }
}

impl Iterator for WalReader {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}
