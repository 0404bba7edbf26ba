//! Dry-run unified diff support for `stitch diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;

use stitch_core::{Artifact, Item, ItemKind};

use crate::error::{ItemError, SyncError};
use crate::log_scope::LogScope;
use crate::outcome::ItemFailure;
use crate::pull::shape;
use crate::remote::Remote;
use crate::writer::{canonical_json, JsonStyle};

/// A single file that pull would change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    /// Project-relative path.
    pub path: PathBuf,
    pub unified_diff: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewResult {
    pub diffs: Vec<FileDiff>,
    /// Remote items that could not be rendered.
    pub errors: Vec<ItemFailure>,
}

/// Render what `pull` would write and compare it to current on-disk content.
///
/// No files are written and the hash cache is not consulted.
pub fn preview_pull(
    root: &Path,
    remote: &mut dyn Remote,
    scope: &LogScope,
) -> Result<PreviewResult, SyncError> {
    let scope = scope.child("diff");
    let mut result = PreviewResult::default();

    for kind in ItemKind::all() {
        let payloads = remote
            .fetch(*kind)
            .map_err(|source| SyncError::Fetch { kind: *kind, source })?;
        for payload in payloads {
            let name = payload.name.clone();
            let rendered = if payload.kind == *kind {
                shape(payload).and_then(|(item, artifact)| render(&item, &artifact))
            } else {
                Err(ItemError::KindMismatch {
                    expected: *kind,
                    found: payload.kind,
                })
            };
            let files = match rendered {
                Ok(files) => files,
                Err(err) => {
                    tracing::warn!(target: scope.target(), "{kind} '{name}': {err}");
                    result.errors.push(ItemFailure::new(format!("{kind} '{name}': {err}")));
                    continue;
                }
            };
            for (rel, rendered) in files {
                let existing = match read_existing_or_empty(root, &rel) {
                    Ok(existing) => existing,
                    Err(err) => {
                        tracing::warn!(target: scope.target(), "{kind} '{name}': {err}");
                        result.errors.push(ItemFailure::new(format!("{kind} '{name}': {err}")));
                        continue;
                    }
                };
                if existing == rendered {
                    continue;
                }
                let unified = TextDiff::from_lines(&existing, &rendered)
                    .unified_diff()
                    .header(&format!("a/{rel}"), &format!("b/{rel}"))
                    .context_radius(3)
                    .to_string();
                result.diffs.push(FileDiff {
                    path: PathBuf::from(rel),
                    unified_diff: unified,
                });
            }
        }
    }

    Ok(result)
}

/// The exact text pull would write for `item`, content file first.
fn render(item: &Item, artifact: &Artifact) -> Result<Vec<(String, String)>, ItemError> {
    let mut files = Vec::with_capacity(2);
    if let (Some(rel), Some(content)) = (artifact.content_path(), item.content()) {
        files.push((rel, content.to_string()));
    }
    if let Some(rel) = artifact.metadata_path() {
        let bytes = canonical_json(&item.metadata(), JsonStyle::default())?;
        files.push((rel, String::from_utf8_lossy(&bytes).into_owned()));
    }
    Ok(files)
}

fn read_existing_or_empty(root: &Path, rel: &str) -> Result<String, ItemError> {
    match std::fs::read(root.join(rel)) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ItemError::Read {
            rel: rel.to_string(),
            source,
        }),
    }
}
