//! Follower affiliation counting.
//!
//! For each user id the procedure reads that user's follower file
//! (`<directory>/<id>.jsonl`, one follower object per line) and counts
//! total followers plus the subset whose free-text `description`
//! contains a fixed keyword, case-insensitively. The follower directory
//! is immutable input supplied at construction; a missing or unreadable
//! follower file is fatal to the worker.

use std::io::BufRead;
use std::path::PathBuf;

use serde_json::{json, Value};

use crate::error::{Result, ShardmillError};
use crate::record::Record;

use super::{keyword::contains_keyword, Outcome, Transform};

/// Emits `{user_id, follower_count, keyword_follower_count}` per id.
#[derive(Debug, Clone)]
pub struct FollowerAffiliation {
    directory: PathBuf,
    keyword: String,
}

impl FollowerAffiliation {
    pub fn new(directory: impl Into<PathBuf>, keyword: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            keyword: keyword.into(),
        }
    }
}

impl Transform for FollowerAffiliation {
    fn name(&self) -> &'static str {
        "count_followers"
    }

    fn projection(&self) -> Option<Vec<String>> {
        Some(vec!["user_id".to_string()])
    }

    fn required_paths(&self) -> Vec<String> {
        vec!["user_id".to_string()]
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        let user_id = record.id_at("user_id")?;
        let path = self.directory.join(format!("{user_id}.jsonl"));

        let file = std::fs::File::open(&path).map_err(|e| {
            ShardmillError::malformed(format!("follower file {}: {e}", path.display()))
        })?;

        let mut follower_count = 0u64;
        let mut keyword_follower_count = 0u64;
        for line in std::io::BufReader::new(file).lines() {
            let line = line.map_err(|e| {
                ShardmillError::malformed(format!("follower file {}: {e}", path.display()))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let follower: Value = serde_json::from_str(&line).map_err(|e| {
                ShardmillError::malformed(format!("follower file {}: {e}", path.display()))
            })?;
            follower_count += 1;
            if let Some(description) = follower.get("description").and_then(Value::as_str) {
                if contains_keyword(description, &self.keyword) {
                    keyword_follower_count += 1;
                }
            }
        }

        Ok(Outcome::Emit(json!({
            "user_id": user_id,
            "follower_count": follower_count,
            "keyword_follower_count": keyword_follower_count,
        })))
    }
}
