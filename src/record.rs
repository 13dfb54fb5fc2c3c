//! # Schema-on-Read Records
//!
//! Records arrive from the store as opaque JSON documents. The engine
//! never assumes a schema; each transform declares the dotted field
//! paths it needs and reads them through this accessor. Identifiers
//! are normalized to `i64` at access time so precision is never lost
//! to an intermediate representation.

use serde_json::Value;

use crate::error::{Result, ShardmillError};

/// One semi-structured record and dotted-path access into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    value: Value,
}

impl Record {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Look up a dotted path like `user.id` or
    /// `retweeted_status.user.id`.
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.path(path).is_some()
    }

    /// String field at a dotted path, if present and textual.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.path(path).and_then(Value::as_str)
    }

    /// Integer field at a dotted path, normalized to `i64`. Accepts
    /// JSON integers and decimal strings, mirroring how upstream
    /// collectors sometimes stringify large identifiers.
    pub fn i64_at(&self, path: &str) -> Option<i64> {
        match self.path(path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Required identifier at a dotted path; a missing or non-integer
    /// value is a malformed record.
    pub fn id_at(&self, path: &str) -> Result<i64> {
        self.i64_at(path).ok_or_else(|| {
            ShardmillError::malformed(format!("field '{path}' is not a 64-bit integer"))
        })
    }

    /// Reduce the record to the given dotted paths, keeping nesting
    /// intact. Paths absent from the record are simply not copied.
    pub fn project(&self, paths: &[String]) -> Record {
        let mut projected = Value::Object(serde_json::Map::new());
        for path in paths {
            if let Some(found) = self.path(path) {
                insert_at_path(&mut projected, path, found.clone());
            }
        }
        Record::new(projected)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Record::new(value)
    }
}

fn insert_at_path(target: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = target;
    for segment in &segments[..segments.len() - 1] {
        let Some(map) = current.as_object_mut() else {
            // An intermediate segment already holds a scalar; nothing
            // deeper can be projected under it.
            return;
        };
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(segments[segments.len() - 1].to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dotted_path_lookup() {
        let record = Record::new(json!({
            "id": 42,
            "user": {"id": 7, "name": "ada"},
            "retweeted_status": {"user": {"id": 99}}
        }));
        assert_eq!(record.i64_at("id"), Some(42));
        assert_eq!(record.i64_at("user.id"), Some(7));
        assert_eq!(record.i64_at("retweeted_status.user.id"), Some(99));
        assert_eq!(record.str_at("user.name"), Some("ada"));
        assert!(record.path("user.missing").is_none());
        assert!(record.path("quoted_status.text").is_none());
    }

    #[test]
    fn test_large_ids_survive_normalization() {
        let record = Record::new(json!({"id": 902_356_121_234_567_890_i64}));
        assert_eq!(record.i64_at("id"), Some(902_356_121_234_567_890));
    }

    #[test]
    fn test_stringified_id_is_parsed() {
        let record = Record::new(json!({"id_str": "902356121234567890"}));
        assert_eq!(record.i64_at("id_str"), Some(902_356_121_234_567_890));
    }

    #[test]
    fn test_id_at_rejects_non_integer() {
        let record = Record::new(json!({"id": "not-a-number"}));
        assert!(matches!(
            record.id_at("id"),
            Err(ShardmillError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_projection_keeps_nesting() {
        let record = Record::new(json!({
            "id": 1,
            "text": "hello",
            "user": {"id": 2, "name": "ada", "followers_count": 5}
        }));
        let projected = record.project(&["id".to_string(), "user.id".to_string()]);
        assert_eq!(projected.value(), &json!({"id": 1, "user": {"id": 2}}));
    }

    #[test]
    fn test_projection_skips_absent_paths() {
        let record = Record::new(json!({"id": 1}));
        let projected = record.project(&["id".to_string(), "user.id".to_string()]);
        assert_eq!(projected.value(), &json!({"id": 1}));
    }
}
