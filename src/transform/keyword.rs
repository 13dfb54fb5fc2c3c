//! Keyword tagging on record text.
//!
//! Matching is a case-insensitive substring test with no tokenization
//! or word-boundary checks: `"ibm"` matches inside `"onIBMx"`. That
//! imprecision is an accepted policy preserved for output
//! compatibility with existing downstream aggregation.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::record::Record;

use super::{Outcome, Transform};

/// Case-insensitive substring containment.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

fn identifying_fields(record: &Record) -> Result<(i64, i64, String)> {
    let id = record.id_at("id")?;
    let user_id = record.id_at("user.id")?;
    let text = record.str_at("text").unwrap_or_default().to_string();
    Ok((id, user_id, text))
}

const TAG_PROJECTION: [&str; 3] = ["id", "user.id", "text"];

/// Tags each record with one boolean `X_0`: does `text` contain the
/// keyword.
#[derive(Debug, Clone)]
pub struct KeywordTag {
    keyword: String,
}

impl KeywordTag {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }
}

impl Transform for KeywordTag {
    fn name(&self) -> &'static str {
        "tag_keyword"
    }

    fn projection(&self) -> Option<Vec<String>> {
        Some(TAG_PROJECTION.iter().map(|s| s.to_string()).collect())
    }

    fn required_paths(&self) -> Vec<String> {
        TAG_PROJECTION.iter().map(|s| s.to_string()).collect()
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        let (id, user_id, text) = identifying_fields(record)?;
        let tagged = contains_keyword(&text, &self.keyword);
        Ok(Outcome::Emit(json!({
            "id": id,
            "user_id": user_id,
            "text": text,
            "X_0": tagged,
        })))
    }
}

/// Tags each record with one boolean per keyword, positionally named
/// `X_0`..`X_{n-1}` in keyword order.
#[derive(Debug, Clone)]
pub struct KeywordSetTag {
    keywords: Vec<String>,
}

impl KeywordSetTag {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }
}

impl Transform for KeywordSetTag {
    fn name(&self) -> &'static str {
        "tag_keywords"
    }

    fn projection(&self) -> Option<Vec<String>> {
        Some(TAG_PROJECTION.iter().map(|s| s.to_string()).collect())
    }

    fn required_paths(&self) -> Vec<String> {
        TAG_PROJECTION.iter().map(|s| s.to_string()).collect()
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        let (id, user_id, text) = identifying_fields(record)?;
        let mut output = Map::new();
        output.insert("id".to_string(), json!(id));
        output.insert("user_id".to_string(), json!(user_id));
        output.insert("text".to_string(), json!(text));
        for (position, keyword) in self.keywords.iter().enumerate() {
            output.insert(
                format!("X_{position}"),
                json!(contains_keyword(&text, keyword)),
            );
        }
        Ok(Outcome::Emit(Value::Object(output)))
    }
}
