//! Configuration for EmberKV
//!
//! Centralized configuration with sensible defaults. The on-disk layout
//! (`wal/kv.wal`, `segments/seg_<N>.sst` under the data directory) is part
//! of the storage contract and is deliberately not configurable.

use std::path::PathBuf;

/// Main configuration for an EmberKV instance
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the `wal/` and `segments/` subdirectories.
    pub data_dir: PathBuf,

    /// Memtable record count that triggers a flush.
    pub mem_limit: usize,

    /// Live segment count that triggers a compaction.
    pub compaction_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            mem_limit: 5,
            compaction_threshold: 3,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn data_dir<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn mem_limit(mut self, records: usize) -> Self {
        self.config.mem_limit = records;
        self
    }

    pub fn compaction_threshold(mut self, segments: usize) -> Self {
        self.config.compaction_threshold = segments;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
