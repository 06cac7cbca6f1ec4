//! Storage Module
//!
//! Persistent storage layer: immutable segment files plus the registry of
//! live segments.
//!
//! ## Responsibilities
//! - Encode/decode segment files with per-record CRC32
//! - Track live segments in registration order (newest wins on read)
//! - Discover existing segments on startup
//! - Serve point lookups across segments, newest to oldest

pub mod segment;
mod store;

pub use store::SegmentStore;
