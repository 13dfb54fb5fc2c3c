//! # Run Configuration
//!
//! Explicit configuration passed into the orchestrator at startup.
//! There is no process-wide mutable state: everything a run needs is
//! carried in a [`MillConfig`] value, with environment-variable
//! overrides available through [`MillConfig::from_env`].

use std::path::PathBuf;

use crate::constants::{
    DEFAULT_SHARD_DIR, DEFAULT_SHARD_SUFFIX, DEFAULT_STAGGER_MS, DEFAULT_WORKER_COUNT,
};
use crate::error::{Result, ShardmillError};

/// Configuration for one annotation run.
#[derive(Debug, Clone)]
pub struct MillConfig {
    /// Logical database name in the document store.
    pub database: String,
    /// Collection to read records from.
    pub collection: String,
    /// Number of parallel shard workers (one partition each).
    pub worker_count: usize,
    /// Delay between consecutive worker starts, in milliseconds.
    pub stagger_ms: u64,
    /// Directory shard files are written into.
    pub shard_dir: PathBuf,
    /// Filename suffix for shard files.
    pub shard_suffix: String,
    /// Optional per-worker timeout; a worker exceeding it fails its own
    /// partition without disturbing siblings.
    pub worker_timeout_ms: Option<u64>,
}

impl Default for MillConfig {
    fn default() -> Self {
        Self {
            database: "tweets".to_string(),
            collection: "tw_raw".to_string(),
            worker_count: DEFAULT_WORKER_COUNT,
            stagger_ms: DEFAULT_STAGGER_MS,
            shard_dir: PathBuf::from(DEFAULT_SHARD_DIR),
            shard_suffix: DEFAULT_SHARD_SUFFIX.to_string(),
            worker_timeout_ms: None,
        }
    }
}

impl MillConfig {
    /// Build a configuration from defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(database) = std::env::var("SHARDMILL_DATABASE") {
            config.database = database;
        }

        if let Ok(collection) = std::env::var("SHARDMILL_COLLECTION") {
            config.collection = collection;
        }

        if let Ok(workers) = std::env::var("SHARDMILL_WORKERS") {
            config.worker_count = workers.parse().map_err(|e| {
                ShardmillError::configuration(format!("Invalid SHARDMILL_WORKERS: {e}"))
            })?;
        }

        if let Ok(stagger) = std::env::var("SHARDMILL_STAGGER_MS") {
            config.stagger_ms = stagger.parse().map_err(|e| {
                ShardmillError::configuration(format!("Invalid SHARDMILL_STAGGER_MS: {e}"))
            })?;
        }

        if let Ok(dir) = std::env::var("SHARDMILL_SHARD_DIR") {
            config.shard_dir = PathBuf::from(dir);
        }

        if let Ok(timeout) = std::env::var("SHARDMILL_WORKER_TIMEOUT_MS") {
            config.worker_timeout_ms = Some(timeout.parse().map_err(|e| {
                ShardmillError::configuration(format!("Invalid SHARDMILL_WORKER_TIMEOUT_MS: {e}"))
            })?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no run can start from.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(ShardmillError::configuration(
                "worker_count must be at least 1",
            ));
        }
        if self.shard_suffix.is_empty() {
            return Err(ShardmillError::configuration(
                "shard_suffix must not be empty",
            ));
        }
        Ok(())
    }
}
