//! # Shard Worker
//!
//! The repeated unit of work: one worker owns one partition, streams
//! that partition's records from its own store session, applies the
//! configured transform, and appends one NDJSON line per emitted
//! record to its private shard file. The sink is released on every
//! exit path, including early termination from an error.

use std::path::PathBuf;
use std::sync::Arc;

use futures::TryStreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Result, ShardmillError};
use crate::partition::Partition;
use crate::source::RecordSource;
use crate::store::RecordStream;
use crate::transform::{FieldPolicy, Outcome, Transform};

/// Per-partition accounting returned by a completed worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub partition: usize,
    /// Records read from the source.
    pub records_in: u64,
    /// Records serialized to the shard file.
    pub written: u64,
    /// Records the transform declined to emit.
    pub filtered: u64,
}

/// One worker bound to one partition, one transform, and one shard
/// file.
pub struct ShardWorker {
    partition: Partition,
    transform: Arc<dyn Transform>,
    shard_path: PathBuf,
}

impl ShardWorker {
    pub fn new(partition: Partition, transform: Arc<dyn Transform>, shard_path: PathBuf) -> Self {
        Self {
            partition,
            transform,
            shard_path,
        }
    }

    /// Run the partition to completion. The shard file is truncated on
    /// open and flushed/closed before this returns, whether the run
    /// succeeded or failed.
    pub async fn run(self, mut source: Box<dyn RecordSource>) -> Result<WorkerReport> {
        info!(
            partition = self.partition.index,
            skip = self.partition.skip,
            limit = self.partition.limit,
            procedure = self.transform.name(),
            "shard worker starting"
        );

        let mut stream = source.open(&self.partition).await?;

        let file = tokio::fs::File::create(&self.shard_path)
            .await
            .map_err(|e| ShardmillError::shard_io(self.shard_path.display().to_string(), &e))?;
        let mut sink = tokio::io::BufWriter::new(file);

        let outcome = self.pump(&mut stream, &mut sink).await;

        // Release the sink on every exit path.
        let flush = sink.shutdown().await;
        let report = outcome?;
        flush.map_err(|e| ShardmillError::shard_io(self.shard_path.display().to_string(), &e))?;

        info!(
            partition = report.partition,
            records_in = report.records_in,
            written = report.written,
            filtered = report.filtered,
            "shard worker finished"
        );
        Ok(report)
    }

    async fn pump(
        &self,
        stream: &mut RecordStream,
        sink: &mut tokio::io::BufWriter<tokio::fs::File>,
    ) -> Result<WorkerReport> {
        let required = self.transform.required_paths();
        let policy = self.transform.missing_field_policy();

        let mut records_in = 0u64;
        let mut written = 0u64;
        let mut filtered = 0u64;

        while let Some(record) = stream.try_next().await? {
            records_in += 1;

            if let Some(missing) = required.iter().find(|path| !record.has_path(path)) {
                match policy {
                    FieldPolicy::Filter => {
                        filtered += 1;
                        continue;
                    }
                    FieldPolicy::Fatal => {
                        return Err(ShardmillError::malformed(format!(
                            "required field '{missing}' absent in partition {}",
                            self.partition.index
                        )));
                    }
                }
            }

            match self.transform.apply(&record)? {
                Outcome::Emit(value) => {
                    let mut line = serde_json::to_string(&value)
                        .map_err(|e| ShardmillError::malformed(e.to_string()))?;
                    line.push('\n');
                    sink.write_all(line.as_bytes()).await.map_err(|e| {
                        ShardmillError::shard_io(self.shard_path.display().to_string(), &e)
                    })?;
                    written += 1;
                }
                Outcome::Filtered => {
                    filtered += 1;
                    debug!(partition = self.partition.index, "record filtered");
                }
            }
        }

        Ok(WorkerReport {
            partition: self.partition.index,
            records_in,
            written,
            filtered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CollectionRange;
    use crate::store::MemoryStore;
    use crate::transform::ParseCreatedAt;
    use serde_json::json;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_collection(
            "db",
            "tweets",
            vec![
                json!({"id": 1, "created_at": "Wed Aug 27 13:08:45 +0000 2008"}),
                json!({"id": 2, "created_at": "Thu Aug 28 01:00:00 +0000 2008"}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_worker_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let shard_path = dir.path().join("parse_created_at-0.jsonl");
        let transform = Arc::new(ParseCreatedAt);

        let source = CollectionRange::new(
            Arc::new(seeded_store()),
            "db",
            "tweets",
            transform.projection(),
        );
        let worker = ShardWorker::new(
            Partition {
                index: 0,
                skip: 0,
                limit: 2,
            },
            transform,
            shard_path.clone(),
        );

        let report = worker.run(Box::new(source)).await.unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.filtered, 0);

        let contents = std::fs::read_to_string(&shard_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], json!(1));
    }

    #[tokio::test]
    async fn test_missing_required_field_is_fatal_for_fatal_policy() {
        let mut store = MemoryStore::new();
        store.insert_collection("db", "tweets", vec![json!({"id": 1})]);

        let dir = tempfile::tempdir().unwrap();
        let shard_path = dir.path().join("parse_created_at-0.jsonl");
        let transform = Arc::new(ParseCreatedAt);
        let source =
            CollectionRange::new(Arc::new(store), "db", "tweets", transform.projection());
        let worker = ShardWorker::new(
            Partition {
                index: 0,
                skip: 0,
                limit: 1,
            },
            transform,
            shard_path.clone(),
        );

        let result = worker.run(Box::new(source)).await;
        assert!(matches!(result, Err(ShardmillError::MalformedRecord { .. })));
        // Sink was still created and released.
        assert!(shard_path.exists());
    }

    #[tokio::test]
    async fn test_truncates_previous_shard_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let shard_path = dir.path().join("parse_created_at-0.jsonl");
        std::fs::write(&shard_path, "stale contents\n").unwrap();

        let transform = Arc::new(ParseCreatedAt);
        let source = CollectionRange::new(
            Arc::new(seeded_store()),
            "db",
            "tweets",
            transform.projection(),
        );
        let worker = ShardWorker::new(
            Partition {
                index: 0,
                skip: 0,
                limit: 1,
            },
            transform,
            shard_path.clone(),
        );
        worker.run(Box::new(source)).await.unwrap();

        let contents = std::fs::read_to_string(&shard_path).unwrap();
        assert!(!contents.contains("stale"));
        assert_eq!(contents.lines().count(), 1);
    }
}
