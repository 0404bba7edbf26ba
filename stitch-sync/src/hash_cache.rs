//! Hash cache: SHA-256 change tracking for every file under a project.
//!
//! Persists a [`HashCacheFile`] JSON document at
//! `<root>/.stitch/file-hashes.json`. The cache is loaded once per run, mutated
//! in memory, and saved once at the end. Saves use the `.tmp` + rename pattern.
//!
//! Loading and saving never fail the caller: a corrupt or unreadable cache
//! degrades to an empty one, and a failed save is logged.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use stitch_core::project;

use crate::changes::{self, ChangeReport};
use crate::error::{io_err, SyncError};
use crate::log_scope::LogScope;

/// Schema tag written into every cache file.
pub const CACHE_VERSION: &str = "1.0";

/// On-disk hash cache payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashCacheFile {
    pub version: String,
    /// Project-relative `/`-separated path → lowercase hex SHA-256.
    pub hashes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl Default for HashCacheFile {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            hashes: BTreeMap::new(),
            synced_at: None,
        }
    }
}

/// Loose read form: `version` may be absent, `hashes` may not.
#[derive(Debug, Deserialize)]
struct StoredHashCache {
    version: Option<String>,
    hashes: BTreeMap<String, String>,
    #[serde(default)]
    synced_at: Option<DateTime<Utc>>,
}

/// SHA-256 of `content`, as 64 lowercase hex characters.
pub fn digest(content: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(content);
    hex::encode(h.finalize())
}

/// Project-relative key for `path`, always `/`-separated.
///
/// Paths outside `root` are keyed by their own components.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// In-memory view of one project's hash cache.
#[derive(Debug)]
pub struct HashCache {
    root: PathBuf,
    file: HashCacheFile,
    scope: LogScope,
}

impl HashCache {
    /// Open the cache for `root`, creating `.stitch/` if needed.
    ///
    /// Never fails: a missing cache starts empty; an unreadable or corrupt one
    /// is logged and replaced by an empty cache.
    pub fn open(root: &Path, scope: &LogScope) -> Self {
        let scope = scope.child("cache");
        let file = load(root, &scope);
        Self {
            root: root.to_path_buf(),
            file,
            scope,
        }
    }

    /// Point the cache at `root`, loading its state. No-op for the current root.
    pub fn initialize(&mut self, root: &Path) {
        if self.root == root {
            return;
        }
        self.file = load(root, &self.scope);
        self.root = root.to_path_buf();
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Backing file location.
    pub fn path(&self) -> PathBuf {
        project::hash_cache_path(&self.root)
    }

    /// `false` iff the cached digest for `path` equals `digest(content)`.
    pub fn should_write(&self, root: &Path, path: &Path, content: &[u8]) -> bool {
        let key = relative_key(root, path);
        match self.file.hashes.get(&key) {
            Some(stored) => stored != &digest(content),
            None => true,
        }
    }

    /// Record `digest(content)` for `path`. Not persisted until [`save`](Self::save).
    pub fn update_hash(&mut self, root: &Path, path: &Path, content: &[u8]) {
        let key = relative_key(root, path);
        self.file.hashes.insert(key, digest(content));
    }

    pub fn hash_of(&self, rel: &str) -> Option<&str> {
        self.file.hashes.get(rel).map(String::as_str)
    }

    /// All tracked keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.file.hashes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.file.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.hashes.is_empty()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.file.synced_at
    }

    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.file.synced_at = Some(at);
    }

    /// Persist the cache. Failures are logged and reported as `false`.
    pub fn save(&self) -> bool {
        match save_at(&self.root, &self.file) {
            Ok(()) => {
                tracing::debug!(
                    target: self.scope.target(),
                    "saved {} hash(es) to {}",
                    self.file.hashes.len(),
                    self.path().display()
                );
                true
            }
            Err(err) => {
                tracing::warn!(target: self.scope.target(), "could not save hash cache: {err}");
                false
            }
        }
    }

    /// Forget every hash and persist the empty cache immediately.
    pub fn clear(&mut self) -> bool {
        self.file = HashCacheFile::default();
        self.save()
    }

    /// Compare the live tracked tree under `root` against this cache.
    pub fn get_changes(&self, root: &Path) -> ChangeReport {
        changes::scan(self, root, &self.scope)
    }
}

fn load(root: &Path, scope: &LogScope) -> HashCacheFile {
    if let Err(err) = project::ensure_stitch_dir(root) {
        tracing::warn!(target: scope.target(), "cannot create state directory: {err}");
    }

    let path = project::hash_cache_path(root);
    if !path.exists() {
        return HashCacheFile::default();
    }

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(
                target: scope.target(),
                "cannot read hash cache {}: {err}; starting empty",
                path.display()
            );
            return HashCacheFile::default();
        }
    };

    match serde_json::from_str::<StoredHashCache>(&contents) {
        Ok(cache) => HashCacheFile {
            version: cache.version.unwrap_or_else(|| CACHE_VERSION.to_string()),
            hashes: cache.hashes,
            synced_at: cache.synced_at,
        },
        Err(err) => {
            tracing::warn!(
                target: scope.target(),
                "hash cache {} is corrupt ({err}); starting empty",
                path.display()
            );
            HashCacheFile::default()
        }
    }
}

/// Save `file` as `<root>/.stitch/file-hashes.json` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
fn save_at(root: &Path, file: &HashCacheFile) -> Result<(), SyncError> {
    project::ensure_stitch_dir(root)?;
    let path = project::hash_cache_path(root);

    let mut json = serde_json::to_string_pretty(file)?;
    json.push('\n');
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}
