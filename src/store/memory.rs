//! In-memory document store.
//!
//! Backs tests and examples without external infrastructure. Records
//! are held in insertion order, which stands in for the stable key
//! order of a real store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ShardmillError};
use crate::record::Record;

use super::{apply_projection, CollectionHandle, DocumentStore, FindOptions, RecordStream};

/// Store holding whole collections in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<(String, String), Arc<Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collection under `database`/`name`, replacing any
    /// previous contents. Records keep the given order.
    pub fn insert_collection(
        &mut self,
        database: impl Into<String>,
        name: impl Into<String>,
        records: Vec<Value>,
    ) {
        self.collections
            .insert((database.into(), name.into()), Arc::new(records));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Box<dyn CollectionHandle>> {
        let records = self
            .collections
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .ok_or_else(|| ShardmillError::StoreConnection {
                target: format!("{database}/{collection}"),
                message: "unknown collection".to_string(),
            })?;
        Ok(Box::new(MemoryCollection { records }))
    }
}

struct MemoryCollection {
    records: Arc<Vec<Value>>,
}

#[async_trait]
impl CollectionHandle for MemoryCollection {
    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    async fn find(&self, options: FindOptions) -> Result<RecordStream> {
        let window: Vec<Result<Record>> = self
            .records
            .iter()
            .skip(options.skip as usize)
            .take(options.limit as usize)
            .map(|value| {
                Ok(apply_projection(
                    Record::new(value.clone()),
                    options.projection.as_ref(),
                ))
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(window)))
    }

    async fn find_one(
        &self,
        field_path: &str,
        id: i64,
        projection: Option<Vec<String>>,
    ) -> Result<Option<Record>> {
        for value in self.records.iter() {
            let record = Record::new(value.clone());
            if record.i64_at(field_path) == Some(id) {
                return Ok(Some(apply_projection(record, projection.as_ref())));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;

    fn store_with_three_records() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_collection(
            "db",
            "tweets",
            vec![
                json!({"id": 1, "text": "a"}),
                json!({"id": 2, "text": "b"}),
                json!({"id": 3, "text": "c"}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_count_and_windowed_find() {
        let store = store_with_three_records();
        let handle = store.collection("db", "tweets").await.unwrap();
        assert_eq!(handle.count().await.unwrap(), 3);

        let records: Vec<Record> = handle
            .find(FindOptions {
                projection: None,
                skip: 1,
                limit: 2,
            })
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].i64_at("id"), Some(2));
        assert_eq!(records[1].i64_at("id"), Some(3));
    }

    #[tokio::test]
    async fn test_find_one_by_nested_path() {
        let mut store = MemoryStore::new();
        store.insert_collection(
            "db",
            "tweets",
            vec![json!({"id": 10, "user": {"id": 7, "name": "ada"}})],
        );
        let handle = store.collection("db", "tweets").await.unwrap();

        let found = handle
            .find_one("user.id", 7, Some(vec!["user".to_string()]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.value(), &json!({"user": {"id": 7, "name": "ada"}}));

        let missing = handle.find_one("user.id", 8, None).await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_unknown_collection_is_connection_error() {
        let store = MemoryStore::new();
        let result = tokio_test::block_on(store.collection("db", "nope"));
        assert!(matches!(
            result.err(),
            Some(ShardmillError::StoreConnection { .. })
        ));
    }
}
