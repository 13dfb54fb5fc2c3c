//! # Error Types
//!
//! Structured error handling for the shard engine using thiserror
//! for typed errors instead of `Box<dyn Error>` patterns.
//!
//! The taxonomy mirrors the failure domains of a run: configuration
//! problems are fatal before any work starts, store problems are fatal
//! to one partition only, and malformed records are judged per
//! transform policy.

use thiserror::Error;

/// Errors produced by partitioning, workers, and the launcher.
#[derive(Error, Debug)]
pub enum ShardmillError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Store connection error: {target}: {message}")]
    StoreConnection { target: String, message: String },

    #[error("Store query error: {collection}: {message}")]
    StoreQuery { collection: String, message: String },

    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    #[error("Shard I/O error: {path}: {message}")]
    ShardIo { path: String, message: String },

    #[error("Id set error: {message}")]
    IdSet { message: String },

    #[error("Worker for partition {partition} timed out after {timeout_ms}ms")]
    WorkerTimeout { partition: usize, timeout_ms: u64 },

    #[error("Worker for partition {partition} panicked: {message}")]
    WorkerPanic { partition: usize, message: String },

    #[error("{} of {total} partitions failed: {indices:?}", indices.len())]
    PartitionsFailed { total: usize, indices: Vec<usize> },
}

impl ShardmillError {
    /// Configuration error from anything printable.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Malformed-record error from anything printable.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Shard I/O error carrying the offending path.
    pub fn shard_io(path: impl Into<String>, source: &std::io::Error) -> Self {
        Self::ShardIo {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShardmillError>;
