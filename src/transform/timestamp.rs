//! Creation-timestamp parsing.
//!
//! Source records carry `created_at` as a fixed-format string like
//! `Wed Aug 27 13:08:45 +0000 2008`. This transform parses it into a
//! Unix timestamp in seconds. A string that does not match the format
//! is fatal to the whole worker, not filtered.

use chrono::DateTime;
use serde_json::json;

use crate::error::{Result, ShardmillError};
use crate::record::Record;

use super::{Outcome, Transform};

/// The fixed `created_at` format: 3-letter weekday, 3-letter month,
/// day, time, UTC offset, 4-digit year.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parse the fixed-format `created_at` string into Unix seconds.
pub fn parse_created_at(created_at: &str) -> Result<f64> {
    let parsed = DateTime::parse_from_str(created_at, CREATED_AT_FORMAT).map_err(|e| {
        ShardmillError::malformed(format!("created_at '{created_at}' does not parse: {e}"))
    })?;
    Ok(parsed.timestamp() as f64 + f64::from(parsed.timestamp_subsec_millis()) / 1000.0)
}

/// Emits `{id, created_at_parsed}` per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseCreatedAt;

impl Transform for ParseCreatedAt {
    fn name(&self) -> &'static str {
        "parse_created_at"
    }

    fn projection(&self) -> Option<Vec<String>> {
        Some(vec!["id".to_string(), "created_at".to_string()])
    }

    fn required_paths(&self) -> Vec<String> {
        vec!["id".to_string(), "created_at".to_string()]
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        let id = record.id_at("id")?;
        let created_at = record
            .str_at("created_at")
            .ok_or_else(|| ShardmillError::malformed("created_at is not a string"))?;
        let timestamp = parse_created_at(created_at)?;
        Ok(Outcome::Emit(json!({
            "id": id,
            "created_at_parsed": timestamp,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike, Utc};
    use serde_json::json;

    #[test]
    fn test_round_trip_reference_timestamp() {
        let timestamp = parse_created_at("Wed Aug 27 13:08:45 +0000 2008").unwrap();
        let reconstructed = Utc.timestamp_opt(timestamp as i64, 0).unwrap();
        assert_eq!(reconstructed.year(), 2008);
        assert_eq!(reconstructed.month(), 8);
        assert_eq!(reconstructed.day(), 27);
        assert_eq!(reconstructed.hour(), 13);
        assert_eq!(reconstructed.minute(), 8);
        assert_eq!(reconstructed.second(), 45);
    }

    #[test]
    fn test_non_utc_offset_is_honored() {
        let with_offset = parse_created_at("Wed Aug 27 13:08:45 +0200 2008").unwrap();
        let utc = parse_created_at("Wed Aug 27 13:08:45 +0000 2008").unwrap();
        assert_eq!((utc - with_offset) as i64, 2 * 3600);
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        assert!(matches!(
            parse_created_at("2008-08-27T13:08:45Z"),
            Err(ShardmillError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_emitted_fields() {
        let record = Record::new(json!({
            "id": 123,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
        }));
        let outcome = ParseCreatedAt.apply(&record).unwrap();
        match outcome {
            Outcome::Emit(value) => {
                assert_eq!(value["id"], json!(123));
                assert!(value["created_at_parsed"].is_f64());
            }
            Outcome::Filtered => panic!("expected an emitted record"),
        }
    }
}
