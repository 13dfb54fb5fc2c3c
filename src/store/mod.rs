//! # Document Store Interface
//!
//! The engine treats the record store as an external collaborator
//! behind two async traits: [`DocumentStore`] opens a dedicated session
//! handle onto one collection, and [`CollectionHandle`] exposes the
//! three operations workers need: `count`, an ordered range `find`, and
//! a single-record `find_one` lookup.
//!
//! Every worker opens its own handle. Sessions are never shared across
//! workers; that isolation boundary is what removes the need for any
//! locking between them.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::record::Record;

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

/// Ordered stream of records from one range query.
pub type RecordStream = BoxStream<'static, Result<Record>>;

/// Options for an ordered range query. Records are always returned
/// sorted ascending by the collection's stable key; `projection`
/// restricts the fields materialized to minimize I/O bandwidth.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Dotted field paths to retain; `None` keeps the full record.
    pub projection: Option<Vec<String>>,
    /// Records to skip from the start of the key order.
    pub skip: u64,
    /// Maximum records to return.
    pub limit: u64,
}

/// A dedicated session onto one collection.
#[async_trait]
pub trait CollectionHandle: Send + Sync {
    /// Number of records currently in the collection. Sampled once per
    /// partitioning decision; concurrent writers are an accepted
    /// limitation, not guarded against.
    async fn count(&self) -> Result<u64>;

    /// Records in stable ascending key order, windowed by
    /// `options.skip` / `options.limit`.
    async fn find(&self, options: FindOptions) -> Result<RecordStream>;

    /// First record whose integer field at `field_path` equals `id`.
    async fn find_one(
        &self,
        field_path: &str,
        id: i64,
        projection: Option<Vec<String>>,
    ) -> Result<Option<Record>>;
}

/// Factory for per-worker collection sessions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a session handle onto `database`/`collection`. Called by
    /// each worker independently.
    async fn collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Box<dyn CollectionHandle>>;
}

/// Apply an optional projection to one record.
pub(crate) fn apply_projection(record: Record, projection: Option<&Vec<String>>) -> Record {
    match projection {
        Some(paths) => record.project(paths),
        None => record,
    }
}
