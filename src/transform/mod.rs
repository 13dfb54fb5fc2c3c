//! # Transform Registry
//!
//! Pluggable per-record transforms. Every transform conforms to one
//! contract: `apply(record) → zero-or-one output record`. A transform
//! must be pure beyond reading immutable inputs supplied at
//! construction (a keyword list, an id set, a follower directory),
//! because workers invoke it concurrently with no shared state.
//!
//! Each transform also declares the dotted field paths it needs
//! projected from the store and its policy for records missing a
//! required path, so the presence/absence decision is made once by the
//! engine instead of ad hoc inside each transform.

use serde_json::Value;

use crate::error::Result;
use crate::record::Record;

pub mod cascade;
pub mod followers;
pub mod keyword;
pub mod sentiment;
pub mod timestamp;
pub mod user;

pub use cascade::CascadeFilter;
pub use followers::FollowerAffiliation;
pub use keyword::{contains_keyword, KeywordSetTag, KeywordTag};
pub use sentiment::SentimentScore;
pub use timestamp::ParseCreatedAt;
pub use user::DereferenceUser;

/// What a transform decided for one input record.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Serialize this value as one output line.
    Emit(Value),
    /// Drop the record silently; not an error.
    Filtered,
}

/// What a missing required field means for this transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The record is malformed; the whole worker fails.
    Fatal,
    /// The record is silently dropped.
    Filter,
}

/// A pure per-record transform.
pub trait Transform: Send + Sync {
    /// Procedure name; also the shard filename base.
    fn name(&self) -> &'static str;

    /// Dotted field paths to project from the store, or `None` for the
    /// full record. Projection is a bandwidth contract, not optional.
    fn projection(&self) -> Option<Vec<String>>;

    /// Dotted field paths that must be present before `apply` runs.
    fn required_paths(&self) -> Vec<String>;

    /// Policy applied when a required path is absent.
    fn missing_field_policy(&self) -> FieldPolicy {
        FieldPolicy::Fatal
    }

    /// Transform one record. Required paths are already known present.
    fn apply(&self, record: &Record) -> Result<Outcome>;
}
