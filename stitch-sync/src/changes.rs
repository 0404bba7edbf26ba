//! Change classification: live tracked tree vs. hash cache.
//!
//! Classification per path:
//! 1. on disk, no cached digest → `new`
//! 2. on disk, cached digest differs → `changed`
//! 3. on disk, cached digest equal → nothing (one read + hash, no writes)
//! 4. cached, not on disk → `deleted`, area inferred from the path text
//!
//! Unreadable files and walk errors are logged and skipped.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use stitch_core::Area;

use crate::hash_cache::{digest, relative_key, HashCache};
use crate::log_scope::LogScope;

/// A regular file found under one of the tracked area directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    pub area: Area,
    /// Project-relative, `/`-separated.
    pub rel: String,
    pub path: PathBuf,
}

/// Paths grouped by area. Areas with no paths are absent.
pub type AreaPaths = BTreeMap<Area, Vec<String>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeTotals {
    pub changed: usize,
    pub new: usize,
    pub deleted: usize,
}

/// Result of comparing the live tree to the hash cache. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub changed: AreaPaths,
    pub new: AreaPaths,
    pub deleted: AreaPaths,
    pub total: ChangeTotals,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.total == ChangeTotals::default()
    }

    /// `changed ∪ new`, area by area (changed before new within an area).
    pub fn pending(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.total.changed + self.total.new);
        for area in Area::all() {
            for bucket in [&self.changed, &self.new] {
                if let Some(paths) = bucket.get(area) {
                    out.extend(paths.iter().cloned());
                }
            }
        }
        out
    }

    fn push(bucket: &mut AreaPaths, area: Area, rel: String) {
        bucket.entry(area).or_default().push(rel);
    }
}

/// Enumerate regular files under every tracked area directory of `root`.
///
/// Hidden files and directories are skipped. Order within an area follows
/// directory enumeration order.
pub fn tracked_files(root: &Path, scope: &LogScope) -> Vec<TrackedFile> {
    let mut files = Vec::new();
    for area in Area::all() {
        let dir = root.join(area.dir());
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(target: scope.target(), "skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            files.push(TrackedFile {
                area: *area,
                rel: relative_key(root, entry.path()),
                path: entry.into_path(),
            });
        }
    }
    files
}

/// Walk `root` and classify every tracked file against `cache`.
pub fn scan(cache: &HashCache, root: &Path, scope: &LogScope) -> ChangeReport {
    let files = tracked_files(root, scope);
    classify(cache, &files, scope)
}

/// Classify an already-enumerated file list against `cache`.
pub fn classify(cache: &HashCache, files: &[TrackedFile], scope: &LogScope) -> ChangeReport {
    let mut report = ChangeReport::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(files.len());

    for file in files {
        seen.insert(file.rel.as_str());
        let content = match std::fs::read(&file.path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(target: scope.target(), "skipping {}: {err}", file.rel);
                continue;
            }
        };
        match cache.hash_of(&file.rel) {
            None => ChangeReport::push(&mut report.new, file.area, file.rel.clone()),
            Some(stored) if stored != digest(&content) => {
                ChangeReport::push(&mut report.changed, file.area, file.rel.clone())
            }
            Some(_) => {}
        }
    }

    for key in cache.keys() {
        if seen.contains(key) {
            continue;
        }
        if let Some(area) = Area::from_path_substring(key) {
            ChangeReport::push(&mut report.deleted, area, key.to_string());
        }
    }

    report.total = ChangeTotals {
        changed: count(&report.changed),
        new: count(&report.new),
        deleted: count(&report.deleted),
    };
    tracing::debug!(
        target: scope.target(),
        "{} changed, {} new, {} deleted",
        report.total.changed,
        report.total.new,
        report.total.deleted
    );
    report
}

fn count(bucket: &AreaPaths) -> usize {
    bucket.values().map(Vec::len).sum()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
