//! # Staggered Launcher
//!
//! Starts one task per partition with a small index-proportional delay
//! to smooth the initial query burst against the shared store, then
//! waits for every worker to terminate. A single worker's failure does
//! not stop siblings already running; the run fails only after all
//! workers have been observed, reporting the failed partition indices.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Result, ShardmillError};
use crate::partition::Partition;
use crate::worker::WorkerReport;

/// Launches and supervises one run's worth of shard workers.
#[derive(Debug, Clone)]
pub struct StaggeredLauncher {
    stagger: Duration,
    worker_timeout: Option<Duration>,
}

impl StaggeredLauncher {
    pub fn new(stagger: Duration) -> Self {
        Self {
            stagger,
            worker_timeout: None,
        }
    }

    /// Fail any worker still running after `timeout`, without
    /// disturbing its siblings.
    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = Some(timeout);
        self
    }

    /// Start one worker per partition, worker `i` delayed by
    /// `i * stagger`, and wait for all of them. Reports are returned in
    /// partition order. If any partition failed the whole run fails
    /// with the set of failed indices.
    pub async fn launch<F>(
        &self,
        partitions: Vec<Partition>,
        mut worker_factory: F,
    ) -> Result<Vec<WorkerReport>>
    where
        F: FnMut(Partition) -> BoxFuture<'static, Result<WorkerReport>>,
    {
        let run_id = Uuid::new_v4();
        let total = partitions.len();
        info!(%run_id, partitions = total, stagger_ms = self.stagger.as_millis() as u64, "launching shard workers");

        let mut task_partitions: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut set: JoinSet<(usize, Result<WorkerReport>)> = JoinSet::new();

        for partition in partitions {
            let index = partition.index;
            let delay = self.stagger * index as u32;
            let timeout = self.worker_timeout;
            let work = worker_factory(partition);

            let handle = set.spawn(async move {
                tokio::time::sleep(delay).await;
                let result = match timeout {
                    Some(timeout) => match tokio::time::timeout(timeout, work).await {
                        Ok(result) => result,
                        Err(_) => Err(ShardmillError::WorkerTimeout {
                            partition: index,
                            timeout_ms: timeout.as_millis() as u64,
                        }),
                    },
                    None => work.await,
                };
                (index, result)
            });
            task_partitions.insert(handle.id(), index);
        }

        let mut reports = Vec::with_capacity(total);
        let mut failed: Vec<usize> = Vec::new();

        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((_, (_, Ok(report)))) => reports.push(report),
                Ok((_, (index, Err(e)))) => {
                    error!(%run_id, partition = index, error = %e, "shard worker failed");
                    failed.push(index);
                }
                Err(join_error) => {
                    let index = task_partitions
                        .get(&join_error.id())
                        .copied()
                        .unwrap_or(usize::MAX);
                    error!(%run_id, partition = index, error = %join_error, "shard worker panicked");
                    failed.push(index);
                }
            }
        }

        if !failed.is_empty() {
            failed.sort_unstable();
            warn!(%run_id, failed = ?failed, "run incomplete; failed partitions must be re-run");
            return Err(ShardmillError::PartitionsFailed {
                total,
                indices: failed,
            });
        }

        reports.sort_by_key(|report| report.partition);
        info!(%run_id, workers = reports.len(), "all shard workers finished");
        Ok(reports)
    }
}
