//! # EmberKV
//!
//! An embeddable, crash-durable key-value store with:
//! - Write-Ahead Logging (WAL), fsynced before every acknowledge
//! - Crash recovery with partial write handling
//! - An in-memory memtable for the hot write epoch
//! - Immutable on-disk segments with per-record CRC32, merged by compaction
//!
//! ## Architecture Overview
//!
//! ```text
//!            put / del                       get
//!                │                            │
//!       ┌────────▼────────┐          ┌────────▼────────┐
//!       │       WAL       │          │    MemTable     │
//!       │ (append+fsync)  │          │    (RwLock)     │
//!       └─────────────────┘          └────────┬────────┘
//!                                             │ miss
//!                                    ┌────────▼────────┐
//!                                    │    Segments     │
//!                                    │  newest→oldest  │
//!                                    └─────────────────┘
//! ```
//!
//! Writes hit the WAL first, then the memtable. When the memtable reaches
//! its record limit it is swapped out and written as an immutable segment;
//! when enough segments accumulate they are merged into one, newest record
//! per key winning. On open, the WAL is replayed to reconstruct whatever
//! the last process had not yet flushed.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
