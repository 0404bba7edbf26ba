//! Push reconciler: local files → remote.
//!
//! discover → categorize → pair → transmit → confirm → persist.
//!
//! Every discovered path is classified by shape; paths belonging to the same
//! artifact collapse into one item. An item's hashes advance only after the
//! remote accepted it, so a failed send leaves its files "changed" for the next
//! run.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use stitch_core::{Artifact, Item, ItemKind};

use crate::changes;
use crate::error::ItemError;
use crate::hash_cache::HashCache;
use crate::log_scope::LogScope;
use crate::outcome::RunStatus;
use crate::remote::{Remote, WirePayload};

/// Which files a push considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PushMode {
    /// Only files the change report lists as changed or new.
    #[default]
    Changed,
    /// Every tracked file, regardless of the cache.
    All,
}

/// One artifact the remote did not receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushFailure {
    /// First discovered path of the artifact.
    pub file: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PushResult {
    pub success: bool,
    pub pushed: Vec<String>,
    /// Tracked files left alone because they were up to date.
    pub skipped: Vec<String>,
    pub errors: Vec<PushFailure>,
}

impl PushResult {
    pub fn status(&self) -> RunStatus {
        if !self.errors.is_empty() {
            RunStatus::Partial
        } else if self.pushed.is_empty() {
            RunStatus::NothingToDo
        } else {
            RunStatus::Complete
        }
    }
}

/// Bytes of one file that went into a payload.
struct SourceFile {
    rel: String,
    bytes: Vec<u8>,
}

/// Push local artifacts under `root` to `remote`.
///
/// Never fails as a whole: every problem is recorded per item.
pub fn push(root: &Path, remote: &mut dyn Remote, mode: PushMode, scope: &LogScope) -> PushResult {
    let scope = scope.child("push");
    let started_at = Utc::now();
    let mut cache = HashCache::open(root, &scope);

    let tracked = changes::tracked_files(root, &scope);
    let discovered: Vec<String> = match mode {
        PushMode::All => tracked.iter().map(|f| f.rel.clone()).collect(),
        PushMode::Changed => changes::classify(&cache, &tracked, &scope).pending(),
    };
    tracing::info!(target: scope.target(), "{} file(s) to consider", discovered.len());

    let mut result = PushResult::default();
    for (artifact, kind, first) in group(&discovered, &scope) {
        let item_scope = scope.child(kind.as_str());
        match push_artifact(root, remote, &artifact, kind) {
            Ok(files) => {
                for file in files {
                    cache.update_hash(root, &root.join(&file.rel), &file.bytes);
                    result.pushed.push(file.rel);
                }
                tracing::info!(target: item_scope.target(), "pushed {first}");
            }
            Err(err) => {
                tracing::warn!(target: item_scope.target(), "{first}: {err}");
                result.errors.push(PushFailure {
                    file: first,
                    kind,
                    message: err.to_string(),
                });
            }
        }
    }

    if mode == PushMode::Changed {
        let considered: HashSet<&str> = discovered
            .iter()
            .chain(result.pushed.iter())
            .map(String::as_str)
            .collect();
        result.skipped = tracked
            .iter()
            .filter(|f| !considered.contains(f.rel.as_str()))
            .map(|f| f.rel.clone())
            .collect();
    }

    if !result.pushed.is_empty() {
        cache.mark_synced(started_at);
    }
    cache.save();

    result.success = result.errors.is_empty();
    result
}

/// Collapse paths into artifacts, keeping first-seen order and the first path
/// seen for each. Unrecognized shapes are dropped.
fn group(paths: &[String], scope: &LogScope) -> Vec<(Artifact, ItemKind, String)> {
    let mut seen: HashSet<Artifact> = HashSet::new();
    let mut out = Vec::new();
    for rel in paths {
        let artifact = Artifact::classify(rel);
        let Some(kind) = artifact.kind() else {
            tracing::debug!(target: scope.target(), "ignoring {rel}");
            continue;
        };
        if seen.insert(artifact.clone()) {
            out.push((artifact, kind, rel.clone()));
        }
    }
    out
}

fn push_artifact(
    root: &Path,
    remote: &mut dyn Remote,
    artifact: &Artifact,
    kind: ItemKind,
) -> Result<Vec<SourceFile>, ItemError> {
    let (item, files) = load_local(root, artifact, kind)?;
    let payload = WirePayload::from_item(&item)?;
    remote.send(&payload)?;
    Ok(files)
}

/// Read and pair the files of one artifact into a typed item.
fn load_local(
    root: &Path,
    artifact: &Artifact,
    kind: ItemKind,
) -> Result<(Item, Vec<SourceFile>), ItemError> {
    let mut files = Vec::with_capacity(2);

    let content = match artifact.content_path() {
        Some(rel) => {
            let bytes = read_required(root, &rel, "content")?;
            let text = String::from_utf8(bytes.clone())
                .map_err(|_| ItemError::NotUtf8 { rel: rel.clone() })?;
            files.push(SourceFile { rel, bytes });
            Some(text)
        }
        None => None,
    };

    let rel = artifact.metadata_path().ok_or_else(|| ItemError::Unrecognized {
        rel: format!("{artifact:?}"),
    })?;
    let bytes = read_required(root, &rel, "metadata")?;
    let metadata: Value = serde_json::from_slice(&bytes).map_err(|source| ItemError::InvalidJson {
        rel: rel.clone(),
        source,
    })?;
    files.push(SourceFile { rel, bytes });

    let item = Item::from_parts(kind, metadata, content)?;
    Ok((item, files))
}

fn read_required(root: &Path, rel: &str, role: &'static str) -> Result<Vec<u8>, ItemError> {
    match std::fs::read(root.join(rel)) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ItemError::MissingFile {
            rel: rel.to_string(),
            role,
        }),
        Err(source) => Err(ItemError::Read {
            rel: rel.to_string(),
            source,
        }),
    }
}
