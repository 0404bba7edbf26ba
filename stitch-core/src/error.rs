//! Error types for stitch-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ItemKind;

/// All errors that can arise from project config and artifact layout operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse project config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No `.stitch/config.yaml` in the start directory or any of its ancestors.
    #[error("no stitch project found at or above {start}; run `stitch init` first")]
    ProjectNotFound { start: PathBuf },

    /// Metadata JSON that does not match the typed schema for its kind.
    #[error("invalid {kind} metadata: {source}")]
    Metadata {
        kind: ItemKind,
        #[source]
        source: serde_json::Error,
    },

    /// A split artifact whose code/content half was not supplied.
    #[error("{kind} '{name}' has no {expected} content")]
    MissingContent {
        kind: ItemKind,
        name: String,
        expected: &'static str,
    },

    /// A customization name that sanitizes to nothing usable as a path segment.
    #[error("name '{name}' has no alphanumeric characters")]
    InvalidName { name: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
