//! Error types for EmberKV
//!
//! Provides a unified error type for all operations.
//!
//! The reason tokens (`KEY_NOT_FOUND`, `SEGMENT_OPEN_FAILED`,
//! `SEGMENT_WRITE_FAILED`, `WAL_NOT_OPEN`) are observable interface:
//! callers and tests match on them. `Display` leads with the token;
//! [`KvError::reason`] returns the bare token.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for EmberKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    /// Key absent from the memtable and from every live segment.
    #[error("KEY_NOT_FOUND")]
    KeyNotFound,

    /// Empty keys are not valid records.
    #[error("INVALID_KEY")]
    InvalidKey,

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    /// A segment file could not be opened or created.
    #[error("SEGMENT_OPEN_FAILED: {0}")]
    SegmentOpenFailed(#[source] std::io::Error),

    /// Writing or fsyncing a segment file failed.
    #[error("SEGMENT_WRITE_FAILED: {0}")]
    SegmentWriteFailed(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    /// The log writer has been closed (or never opened).
    #[error("WAL_NOT_OPEN")]
    WalNotOpen,

    /// Appending or fsyncing a log record failed. The memtable is left
    /// untouched when this is returned.
    #[error("WAL_APPEND_FAILED: {0}")]
    WalAppend(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl KvError {
    /// Bare reason token, stable across releases.
    pub fn reason(&self) -> &'static str {
        match self {
            KvError::KeyNotFound => "KEY_NOT_FOUND",
            KvError::InvalidKey => "INVALID_KEY",
            KvError::SegmentOpenFailed(_) => "SEGMENT_OPEN_FAILED",
            KvError::SegmentWriteFailed(_) => "SEGMENT_WRITE_FAILED",
            KvError::WalNotOpen => "WAL_NOT_OPEN",
            KvError::WalAppend(_) => "WAL_APPEND_FAILED",
            KvError::Io(_) => "IO_ERROR",
        }
    }
}
