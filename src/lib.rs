#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Shardmill
//!
//! Parallel shard-worker engine for batch annotation of large, ordered
//! document-store collections.
//!
//! ## Overview
//!
//! Given a collection of size N and a worker count P, shardmill assigns
//! each worker a disjoint, order-preserving slice of the collection,
//! executes a pluggable per-record transform over that slice, and
//! writes results as line-delimited JSON to a dedicated shard file —
//! uniformly for every transform kind. Workers are independent tasks
//! with no shared mutable state: each opens its own store session, so
//! disjoint `(skip, limit)` windows over the stable key order make
//! locking unnecessary.
//!
//! ## Module Organization
//!
//! - [`partition`] - Deterministic range partitioning
//! - [`launcher`] - Staggered worker startup and supervision
//! - [`worker`] - The per-partition shard worker
//! - [`source`] - Range and per-id record sources
//! - [`transform`] - The pluggable per-record transforms
//! - [`store`] - Document store traits and backends
//! - [`shard`] - Deterministic shard naming and merging
//! - [`orchestrator`] - Run orchestration glue
//! - [`config`] - Run configuration
//! - [`idset`] - Read-only persisted id sets
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shardmill::config::MillConfig;
//! use shardmill::orchestrator::Orchestrator;
//! use shardmill::store::JsonlStore;
//! use shardmill::transform::ParseCreatedAt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MillConfig::from_env()?;
//! let store = Arc::new(JsonlStore::new("data/store"));
//! let orchestrator = Orchestrator::new(config, store)?;
//!
//! let summary = orchestrator
//!     .run_collection_procedure(Arc::new(ParseCreatedAt))
//!     .await?;
//! println!("{} records written across {} shards", summary.written, summary.worker_count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod idset;
pub mod launcher;
pub mod logging;
pub mod orchestrator;
pub mod partition;
pub mod record;
pub mod shard;
pub mod source;
pub mod store;
pub mod transform;
pub mod worker;

pub use config::MillConfig;
pub use error::{Result, ShardmillError};
pub use launcher::StaggeredLauncher;
pub use orchestrator::{Orchestrator, RunSummary};
pub use partition::{partition_collection, Partition};
pub use record::Record;
pub use shard::ShardMerger;
pub use worker::{ShardWorker, WorkerReport};
