//! User dereferencing.
//!
//! The dereference procedure walks a sorted list of unique user ids,
//! looks each one up in the collection (see
//! [`crate::source::UserLookup`]), and emits the nested user object
//! verbatim. This transform is the emit half of that pair: its input
//! records are `find_one` results projected to `{"user": {...}}`.

use crate::error::Result;
use crate::record::Record;

use super::{Outcome, Transform};

/// Emits the nested `user` object of each looked-up record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DereferenceUser;

impl Transform for DereferenceUser {
    fn name(&self) -> &'static str {
        "get_unique_user"
    }

    fn projection(&self) -> Option<Vec<String>> {
        Some(vec!["user".to_string()])
    }

    fn required_paths(&self) -> Vec<String> {
        vec!["user".to_string()]
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        // required_paths guarantees presence.
        match record.path("user") {
            Some(user) => Ok(Outcome::Emit(user.clone())),
            None => Ok(Outcome::Filtered),
        }
    }
}
