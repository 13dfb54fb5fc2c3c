//! # Shard Naming and Merging
//!
//! Shard files are named deterministically from the procedure name and
//! partition index (`<procedure>-<index>.<suffix>`), so a downstream
//! stage can enumerate and concatenate a run's output in index order
//! with no side-channel manifest.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Result, ShardmillError};
use crate::record::Record;

/// Shard file path for one `(procedure, partition index)` pair.
pub fn shard_path(dir: &Path, procedure: &str, index: usize, suffix: &str) -> PathBuf {
    dir.join(format!("{procedure}-{index}.{suffix}"))
}

/// All shard paths for a run, in partition-index order.
pub fn shard_paths(dir: &Path, procedure: &str, worker_count: usize, suffix: &str) -> Vec<PathBuf> {
    (0..worker_count)
        .map(|index| shard_path(dir, procedure, index, suffix))
        .collect()
}

/// Reads a completed run's shard set back in index order.
#[derive(Debug, Clone)]
pub struct ShardMerger {
    paths: Vec<PathBuf>,
}

impl ShardMerger {
    pub fn new(dir: &Path, procedure: &str, worker_count: usize, suffix: &str) -> Self {
        Self {
            paths: shard_paths(dir, procedure, worker_count, suffix),
        }
    }

    /// Concatenate all shards into `output`, preserving record order.
    /// Returns the number of lines written.
    pub async fn merge_to_file(&self, output: &Path) -> Result<u64> {
        let file = tokio::fs::File::create(output)
            .await
            .map_err(|e| ShardmillError::shard_io(output.display().to_string(), &e))?;
        let mut sink = tokio::io::BufWriter::new(file);
        let mut lines = 0u64;

        for path in &self.paths {
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ShardmillError::shard_io(path.display().to_string(), &e))?;
            for line in contents.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                sink.write_all(line.as_bytes())
                    .await
                    .map_err(|e| ShardmillError::shard_io(output.display().to_string(), &e))?;
                sink.write_all(b"\n")
                    .await
                    .map_err(|e| ShardmillError::shard_io(output.display().to_string(), &e))?;
                lines += 1;
            }
        }

        sink.shutdown()
            .await
            .map_err(|e| ShardmillError::shard_io(output.display().to_string(), &e))?;
        info!(shards = self.paths.len(), lines, output = %output.display(), "shards merged");
        Ok(lines)
    }

    /// Load all shard records into memory in index order, for
    /// downstream analysis.
    pub async fn collect_records(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for path in &self.paths {
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ShardmillError::shard_io(path.display().to_string(), &e))?;
            for line in contents.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let value: serde_json::Value = serde_json::from_str(line)
                    .map_err(|e| ShardmillError::malformed(e.to_string()))?;
                records.push(Record::new(value));
            }
        }
        Ok(records)
    }
}
