//! # Run Orchestration
//!
//! Glue between the pieces: sample the collection size once, compute
//! the partition set, launch staggered workers each bound to one
//! partition and one transform, and report the completed shard file
//! set. Three procedure shapes cover the built-in transforms: a range
//! walk over the collection, a per-id user lookup, and a per-id walk
//! that needs no store at all (follower counting).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::info;

use crate::config::MillConfig;
use crate::error::{Result, ShardmillError};
use crate::launcher::StaggeredLauncher;
use crate::partition::{partition_collection, Partition};
use crate::shard::shard_path;
use crate::source::{CollectionRange, IdSlice, RecordSource, UserLookup};
use crate::store::DocumentStore;
use crate::transform::Transform;
use crate::worker::{ShardWorker, WorkerReport};

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub procedure: String,
    pub collection_size: u64,
    pub worker_count: usize,
    pub records_in: u64,
    pub written: u64,
    pub filtered: u64,
    /// Shard files in partition-index order.
    pub shard_files: Vec<PathBuf>,
}

/// Drives annotation runs against one document store.
pub struct Orchestrator {
    config: MillConfig,
    store: Arc<dyn DocumentStore>,
}

impl Orchestrator {
    pub fn new(config: MillConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    fn launcher(&self) -> StaggeredLauncher {
        let launcher = StaggeredLauncher::new(Duration::from_millis(self.config.stagger_ms));
        match self.config.worker_timeout_ms {
            Some(ms) => launcher.with_worker_timeout(Duration::from_millis(ms)),
            None => launcher,
        }
    }

    async fn prepare_shard_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.shard_dir)
            .await
            .map_err(|e| ShardmillError::shard_io(self.config.shard_dir.display().to_string(), &e))
    }

    /// Run a transform over every record of the configured collection.
    pub async fn run_collection_procedure(
        &self,
        transform: Arc<dyn Transform>,
    ) -> Result<RunSummary> {
        let handle = self
            .store
            .collection(&self.config.database, &self.config.collection)
            .await?;
        // Size is sampled once; a concurrent writer invalidating it
        // mid-run is an accepted limitation.
        let collection_size = handle.count().await?;
        drop(handle);

        let store = Arc::clone(&self.store);
        let database = self.config.database.clone();
        let collection = self.config.collection.clone();
        let projection = transform.projection();

        self.run_with(collection_size, transform, move |_| {
            Box::new(CollectionRange::new(
                Arc::clone(&store),
                database.clone(),
                collection.clone(),
                projection.clone(),
            ))
        })
        .await
    }

    /// Run a transform over per-id lookups of a sorted unique-id list
    /// (the dereference-user shape).
    pub async fn run_id_lookup_procedure(
        &self,
        transform: Arc<dyn Transform>,
        ids: Vec<i64>,
        lookup_path: &str,
    ) -> Result<RunSummary> {
        let ids = sorted_ids(ids);
        let total = ids.len() as u64;

        let store = Arc::clone(&self.store);
        let database = self.config.database.clone();
        let collection = self.config.collection.clone();
        let projection = transform.projection();
        let lookup_path = lookup_path.to_string();

        self.run_with(total, transform, move |_| {
            Box::new(UserLookup::new(
                Arc::clone(&store),
                database.clone(),
                collection.clone(),
                Arc::clone(&ids),
                lookup_path.clone(),
                projection.clone(),
            ))
        })
        .await
    }

    /// Run a transform over a sorted id list directly, with no store
    /// query per record (the follower-counting shape).
    pub async fn run_id_slice_procedure(
        &self,
        transform: Arc<dyn Transform>,
        ids: Vec<i64>,
        id_field: &str,
    ) -> Result<RunSummary> {
        let ids = sorted_ids(ids);
        let total = ids.len() as u64;
        let id_field = id_field.to_string();

        self.run_with(total, transform, move |_| {
            Box::new(IdSlice::new(Arc::clone(&ids), id_field.clone()))
        })
        .await
    }

    async fn run_with<F>(
        &self,
        collection_size: u64,
        transform: Arc<dyn Transform>,
        mut source_factory: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&Partition) -> Box<dyn RecordSource>,
    {
        let procedure = transform.name();
        let partitions = partition_collection(collection_size, self.config.worker_count)?;
        self.prepare_shard_dir().await?;

        info!(
            procedure,
            collection_size,
            workers = self.config.worker_count,
            "procedure starting"
        );

        let shard_dir = self.config.shard_dir.clone();
        let suffix = self.config.shard_suffix.clone();
        let reports = self
            .launcher()
            .launch(partitions, |partition| {
                let source = source_factory(&partition);
                let worker = ShardWorker::new(
                    partition,
                    Arc::clone(&transform),
                    shard_path(&shard_dir, procedure, partition.index, &suffix),
                );
                worker.run(source).boxed()
            })
            .await?;

        Ok(self.summarize(procedure, collection_size, reports))
    }

    fn summarize(
        &self,
        procedure: &str,
        collection_size: u64,
        reports: Vec<WorkerReport>,
    ) -> RunSummary {
        let shard_files = crate::shard::shard_paths(
            &self.config.shard_dir,
            procedure,
            self.config.worker_count,
            &self.config.shard_suffix,
        );
        RunSummary {
            procedure: procedure.to_string(),
            collection_size,
            worker_count: self.config.worker_count,
            records_in: reports.iter().map(|r| r.records_in).sum(),
            written: reports.iter().map(|r| r.written).sum(),
            filtered: reports.iter().map(|r| r.filtered).sum(),
            shard_files,
        }
    }
}

/// Sort and deduplicate caller-supplied ids so the partitioned walk
/// over them is deterministic.
fn sorted_ids(ids: Vec<i64>) -> Arc<Vec<i64>> {
    let mut ids = ids;
    ids.sort_unstable();
    ids.dedup();
    Arc::new(ids)
}
