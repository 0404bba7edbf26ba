//! Error types for stitch-sync.

use std::path::PathBuf;

use thiserror::Error;

use stitch_core::{CoreError, ItemKind};

use crate::remote::RemoteError;

/// All errors that can escape a sync operation.
///
/// Item-level failures never surface here: they are collected into the run
/// result. Only failures that stop a whole run (or a single write the caller
/// asked for directly) are returned as `SyncError`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from project config or artifact layout.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote listing for a whole category could not be obtained.
    #[error("failed to fetch {} from remote: {source}", .kind.category_label())]
    Fetch {
        kind: ItemKind,
        #[source]
        source: RemoteError,
    },
}

/// Why a single item could not be pulled or pushed.
///
/// Always caught at the item loop boundary and recorded in the run result.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("missing {role} file {rel}")]
    MissingFile { rel: String, role: &'static str },

    #[error("cannot read {rel}: {source}")]
    Read {
        rel: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {rel}: {source}")]
    InvalidJson {
        rel: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{rel} is not valid UTF-8")]
    NotUtf8 { rel: String },

    #[error("{rel} does not belong to any customization")]
    Unrecognized { rel: String },

    #[error("remote listed a {found} while fetching {expected} items")]
    KindMismatch { expected: ItemKind, found: ItemKind },

    #[error(transparent)]
    Shape(#[from] CoreError),

    #[error("cannot serialize payload: {0}")]
    Wire(#[from] serde_json::Error),

    #[error("remote rejected item: {0}")]
    Transmit(#[from] RemoteError),

    #[error(transparent)]
    Write(#[from] SyncError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
