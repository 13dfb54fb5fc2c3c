//! # Record Sources
//!
//! The original procedures have two query shapes, both partitioned the
//! same way: an ordered range query over a collection, and a per-id
//! lookup walk over a sorted unique-id list. A [`RecordSource`] turns a
//! partition into an ordered record stream so the shard worker stays
//! generic over both.
//!
//! Each source opens its own store session inside `open`, so no
//! connection is ever shared between workers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{Result, ShardmillError};
use crate::partition::Partition;
use crate::record::Record;
use crate::store::{DocumentStore, FindOptions, RecordStream};

/// Turns one partition into an ordered stream of input records.
#[async_trait]
pub trait RecordSource: Send {
    async fn open(&mut self, partition: &Partition) -> Result<RecordStream>;
}

/// Ordered range query over one collection: sort by the stable key,
/// offset by `partition.skip`, bounded to `partition.limit`, projecting
/// only the fields the transform declared.
pub struct CollectionRange {
    store: Arc<dyn DocumentStore>,
    database: String,
    collection: String,
    projection: Option<Vec<String>>,
}

impl CollectionRange {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        database: impl Into<String>,
        collection: impl Into<String>,
        projection: Option<Vec<String>>,
    ) -> Self {
        Self {
            store,
            database: database.into(),
            collection: collection.into(),
            projection,
        }
    }
}

#[async_trait]
impl RecordSource for CollectionRange {
    async fn open(&mut self, partition: &Partition) -> Result<RecordStream> {
        let handle = self
            .store
            .collection(&self.database, &self.collection)
            .await?;
        handle
            .find(FindOptions {
                projection: self.projection.clone(),
                skip: partition.skip,
                limit: partition.limit,
            })
            .await
    }
}

fn id_window(ids: &[i64], partition: &Partition) -> Vec<i64> {
    ids.iter()
        .skip(partition.skip as usize)
        .take(partition.limit as usize)
        .copied()
        .collect()
}

/// Per-id `find_one` walk over a slice of a sorted id list. Yields the
/// looked-up records; an id with no matching record is malformed input
/// (the id list is supposed to have been derived from this
/// collection).
pub struct UserLookup {
    store: Arc<dyn DocumentStore>,
    database: String,
    collection: String,
    ids: Arc<Vec<i64>>,
    lookup_path: String,
    projection: Option<Vec<String>>,
}

impl UserLookup {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        database: impl Into<String>,
        collection: impl Into<String>,
        ids: Arc<Vec<i64>>,
        lookup_path: impl Into<String>,
        projection: Option<Vec<String>>,
    ) -> Self {
        Self {
            store,
            database: database.into(),
            collection: collection.into(),
            ids,
            lookup_path: lookup_path.into(),
            projection,
        }
    }
}

#[async_trait]
impl RecordSource for UserLookup {
    async fn open(&mut self, partition: &Partition) -> Result<RecordStream> {
        let handle = self
            .store
            .collection(&self.database, &self.collection)
            .await?;
        let window = id_window(&self.ids, partition);
        let lookup_path = self.lookup_path.clone();
        let projection = self.projection.clone();

        let stream = futures::stream::try_unfold(
            (handle, window.into_iter(), lookup_path, projection),
            |(handle, mut ids, lookup_path, projection)| async move {
                let Some(id) = ids.next() else {
                    return Ok(None);
                };
                let record = handle
                    .find_one(&lookup_path, id, projection.clone())
                    .await?
                    .ok_or_else(|| {
                        ShardmillError::malformed(format!("no record with {lookup_path} == {id}"))
                    })?;
                Ok(Some((record, (handle, ids, lookup_path, projection))))
            },
        );
        Ok(Box::pin(stream))
    }
}

/// Wraps a slice of a sorted id list as records `{"<field>": id}`, for
/// transforms that resolve the id themselves (follower counting).
pub struct IdSlice {
    ids: Arc<Vec<i64>>,
    field: String,
}

impl IdSlice {
    pub fn new(ids: Arc<Vec<i64>>, field: impl Into<String>) -> Self {
        Self {
            ids,
            field: field.into(),
        }
    }
}

#[async_trait]
impl RecordSource for IdSlice {
    async fn open(&mut self, partition: &Partition) -> Result<RecordStream> {
        let field = self.field.clone();
        let window: Vec<Result<Record>> = id_window(&self.ids, partition)
            .into_iter()
            .map(|id| {
                let mut wrapper = serde_json::Map::new();
                wrapper.insert(field.clone(), json!(id));
                Ok(Record::new(serde_json::Value::Object(wrapper)))
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(window)))
    }
}
