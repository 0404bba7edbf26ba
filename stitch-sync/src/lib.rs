//! # stitch-sync
//!
//! Change detection and reconciliation between a project tree and the remote.
//!
//! - [`HashCache`] remembers the digest of every file last written or pushed.
//! - [`HashCache::get_changes`] classifies the live tree as changed / new / deleted.
//! - [`ConditionalWriter`] skips writes whose bytes the cache already holds.
//! - [`pull`] and [`push`] run whole-project reconciliations against a [`Remote`].
//! - [`preview_pull`] shows what a pull would change, as unified diffs.

pub mod changes;
pub mod diff;
pub mod error;
pub mod hash_cache;
pub mod log_scope;
pub mod outcome;
pub mod pull;
pub mod push;
pub mod remote;
pub mod writer;

pub use changes::{ChangeReport, ChangeTotals};
pub use diff::{preview_pull, FileDiff, PreviewResult};
pub use error::{ItemError, SyncError};
pub use hash_cache::{digest, HashCache, HashCacheFile};
pub use log_scope::LogScope;
pub use outcome::{ItemFailure, RunStatus};
pub use pull::{pull, CategoryResult, PullOptions, PullResult};
pub use push::{push, PushFailure, PushMode, PushResult};
pub use remote::{Remote, RemoteError, WirePayload};
pub use writer::{canonical_json, ConditionalWriter, JsonStyle, WriteResult};
