//! Cascade (repost) filtering.
//!
//! Retains the full original record only when the reposted-from user id
//! is a member of a caller-supplied id set. A record with no
//! `retweeted_status.user.id` is a native post, not a repost, and is
//! filtered out gracefully rather than treated as malformed.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::Result;
use crate::record::Record;

use super::{FieldPolicy, Outcome, Transform};

const CASCADE_ID_PATH: &str = "retweeted_status.user.id";

/// Keeps reposts originating from a known set of user ids.
///
/// Quote and reply relationships (`quoted_status`,
/// `in_reply_to_user_id`) exist in source records but are not part of
/// this filter's membership test.
#[derive(Debug, Clone)]
pub struct CascadeFilter {
    member_ids: Arc<BTreeSet<i64>>,
}

impl CascadeFilter {
    pub fn new(member_ids: Arc<BTreeSet<i64>>) -> Self {
        Self { member_ids }
    }
}

impl Transform for CascadeFilter {
    fn name(&self) -> &'static str {
        "filter_cascade"
    }

    fn projection(&self) -> Option<Vec<String>> {
        // The retained record is emitted verbatim, so the full record
        // is needed.
        None
    }

    fn required_paths(&self) -> Vec<String> {
        vec![CASCADE_ID_PATH.to_string()]
    }

    fn missing_field_policy(&self) -> FieldPolicy {
        FieldPolicy::Filter
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        let origin_user_id = record.id_at(CASCADE_ID_PATH)?;
        if self.member_ids.contains(&origin_user_id) {
            Ok(Outcome::Emit(record.value().clone()))
        } else {
            Ok(Outcome::Filtered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter_with(ids: &[i64]) -> CascadeFilter {
        CascadeFilter::new(Arc::new(ids.iter().copied().collect()))
    }

    #[test]
    fn test_member_repost_is_retained_verbatim() {
        let record = Record::new(json!({
            "id": 5,
            "text": "RT @ibm: news",
            "retweeted_status": {"user": {"id": 42}, "text": "news"},
        }));
        let outcome = filter_with(&[42]).apply(&record).unwrap();
        assert_eq!(outcome, Outcome::Emit(record.value().clone()));
    }

    #[test]
    fn test_non_member_repost_is_dropped() {
        let record = Record::new(json!({
            "id": 5,
            "retweeted_status": {"user": {"id": 7}},
        }));
        assert_eq!(filter_with(&[42]).apply(&record).unwrap(), Outcome::Filtered);
    }

    #[test]
    fn test_missing_cascade_path_filters_not_fails() {
        let filter = filter_with(&[42]);
        assert_eq!(filter.missing_field_policy(), FieldPolicy::Filter);
        let native = Record::new(json!({"id": 5, "text": "native post"}));
        assert!(!native.has_path("retweeted_status.user.id"));
    }
}
