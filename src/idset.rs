//! # Persisted Id Sets
//!
//! Some procedures filter records against an externally-supplied set of
//! 64-bit identifiers (already-known user ids). The set is persisted as
//! a JSON object mapping a set name to an array of ids, opened
//! read-only, and loaded once per worker.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, ShardmillError};

/// Read-only store of named id sets.
#[derive(Debug, Clone)]
pub struct IdSetStore {
    path: PathBuf,
}

impl IdSetStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the id set stored under `key`. Ids are returned sorted so a
    /// partitioned walk over them is deterministic.
    pub fn load(&self, key: &str) -> Result<BTreeSet<i64>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| ShardmillError::IdSet {
            message: format!("{}: {e}", self.path.display()),
        })?;
        let document: Value = serde_json::from_str(&raw).map_err(|e| ShardmillError::IdSet {
            message: format!("{}: {e}", self.path.display()),
        })?;

        let ids = document
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| ShardmillError::IdSet {
                message: format!("key '{key}' not found in {}", self.path.display()),
            })?;

        let mut set = BTreeSet::new();
        for id in ids {
            let id = id.as_i64().ok_or_else(|| ShardmillError::IdSet {
                message: format!("key '{key}' holds a non-integer id: {id}"),
            })?;
            set.insert(id);
        }
        Ok(set)
    }
}
