//! # System Constants
//!
//! Default operational values shared by configuration and the
//! orchestration layer.

/// Default number of parallel shard workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default delay between consecutive worker starts, in milliseconds.
/// Staggering smooths the initial query burst against the shared store;
/// it is a pacing aid, not a correctness requirement.
pub const DEFAULT_STAGGER_MS: u64 = 500;

/// Default directory for intermediate shard files.
pub const DEFAULT_SHARD_DIR: &str = "inter";

/// Default filename suffix for shard files.
pub const DEFAULT_SHARD_SUFFIX: &str = "jsonl";
