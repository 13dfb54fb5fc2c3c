//! Line-delimited JSON document store.
//!
//! A store root is a directory tree of `<database>/<collection>.jsonl`
//! files, each line one record, lines already in stable ascending key
//! order. This is the crate's concrete store for local corpora; the
//! same traits can front a remote document database.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncBufReadExt;

use crate::error::{Result, ShardmillError};
use crate::record::Record;

use super::{apply_projection, CollectionHandle, DocumentStore, FindOptions, RecordStream};

/// Store rooted at a directory of `.jsonl` collection files.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    root: PathBuf,
}

impl JsonlStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn collection_path(&self, database: &str, collection: &str) -> PathBuf {
        self.root.join(database).join(format!("{collection}.jsonl"))
    }
}

#[async_trait]
impl DocumentStore for JsonlStore {
    async fn collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Box<dyn CollectionHandle>> {
        let path = self.collection_path(database, collection);
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ShardmillError::StoreConnection {
                target: path.display().to_string(),
                message: e.to_string(),
            })?
        {
            return Err(ShardmillError::StoreConnection {
                target: format!("{database}/{collection}"),
                message: format!("no collection file at {}", path.display()),
            });
        }
        Ok(Box::new(JsonlCollection {
            name: collection.to_string(),
            path,
        }))
    }
}

struct JsonlCollection {
    name: String,
    path: PathBuf,
}

impl JsonlCollection {
    async fn open_lines(&self) -> Result<tokio::io::Lines<tokio::io::BufReader<tokio::fs::File>>> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| ShardmillError::StoreConnection {
                target: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(tokio::io::BufReader::new(file).lines())
    }

    fn query_error(&self, message: impl std::fmt::Display) -> ShardmillError {
        ShardmillError::StoreQuery {
            collection: self.name.clone(),
            message: message.to_string(),
        }
    }

    fn parse_line(&self, line: &str) -> Result<Record> {
        serde_json::from_str(line)
            .map(Record::new)
            .map_err(|e| self.query_error(e))
    }
}

#[async_trait]
impl CollectionHandle for JsonlCollection {
    async fn count(&self) -> Result<u64> {
        let mut lines = self.open_lines().await?;
        let mut count = 0u64;
        while let Some(line) = lines.next_line().await.map_err(|e| self.query_error(e))? {
            if !line.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn find(&self, options: FindOptions) -> Result<RecordStream> {
        // Collections are read once per worker; materializing the
        // window keeps the handle free of borrowed state.
        let mut lines = self.open_lines().await?;
        let mut window: Vec<Result<Record>> = Vec::new();
        let mut position = 0u64;
        while let Some(line) = lines.next_line().await.map_err(|e| self.query_error(e))? {
            if line.trim().is_empty() {
                continue;
            }
            if position >= options.skip {
                if window.len() as u64 >= options.limit {
                    break;
                }
                let record = self
                    .parse_line(&line)
                    .map(|r| apply_projection(r, options.projection.as_ref()));
                window.push(record);
            }
            position += 1;
        }
        Ok(Box::pin(futures::stream::iter(window)))
    }

    async fn find_one(
        &self,
        field_path: &str,
        id: i64,
        projection: Option<Vec<String>>,
    ) -> Result<Option<Record>> {
        let mut lines = self.open_lines().await?;
        while let Some(line) = lines.next_line().await.map_err(|e| self.query_error(e))? {
            if line.trim().is_empty() {
                continue;
            }
            let record = self.parse_line(&line)?;
            if record.i64_at(field_path) == Some(id) {
                return Ok(Some(apply_projection(record, projection.as_ref())));
            }
        }
        Ok(None)
    }
}
