//! WAL record codec
//!
//! Encoding and the operation kind carried by each log record. Decoding is
//! streaming and lives in the reader, which owns the trailing-truncation
//! policy.

/// Op-kind tags on disk.
pub(crate) const OP_PUT: u8 = 1;
pub(crate) const OP_DEL: u8 = 2;

/// Fixed part of a record: CRC (4) + type (1) + key len (4) + value len (4).
pub const RECORD_HEADER_SIZE: usize = 13;

/// A logical update carried by one WAL record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl Operation {
    /// The key this operation targets.
    pub fn key(&self) -> &[u8] {
        match self {
            Operation::Put { key, .. } => key,
            Operation::Delete { key } => key,
        }
    }

    /// Serialize this operation to record bytes (including the CRC header).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Operation::Put { key, value } => encode_record(OP_PUT, key, value),
            Operation::Delete { key } => encode_record(OP_DEL, key, &[]),
        }
    }
}

/// Build one record: CRC slot first, then the payload, then the CRC is
/// computed over everything after the slot and written back into it.
pub(crate) fn encode_record(tag: u8, key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(RECORD_HEADER_SIZE + key.len() + value.len());

    buf.extend_from_slice(&[0u8; 4]);
    buf.push(tag);
    buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);

    let crc = crc32fast::hash(&buf[4..]);
    buf[0..4].copy_from_slice(&crc.to_le_bytes());

    buf
}
