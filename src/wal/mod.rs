//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record before any memtable mutation
//! - fsync before acknowledging (a returned append is a durable append)
//! - CRC32 checksums for corruption detection
//! - Replay on open, stopping at the first malformed record
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │ Record 1                                              │
//! │ ┌────────┬─────────┬─────────┬─────────┬─────┬──────┐ │
//! │ │ CRC (4)│ Type (1)│ KLen (4)│ VLen (4)│ Key │Value │ │
//! │ └────────┴─────────┴─────────┴─────────┴─────┴──────┘ │
//! ├───────────────────────────────────────────────────────┤
//! │ Record 2 ...                                          │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! All integers little-endian. Type is 1 for PUT, 2 for DEL; VLen is 0 and
//! no value bytes follow for DEL. The CRC covers everything after itself.
//! A crash mid-append leaves a short or mismatching tail record, which
//! replay treats as end-of-file: the surviving prefix is exactly the set of
//! records that were acknowledged durable.

mod record;
mod reader;
mod recovery;
mod writer;

pub use record::{Operation, RECORD_HEADER_SIZE};
pub use reader::WalReader;
pub use recovery::{replay, RecoveryStats};
pub use writer::WalWriter;
