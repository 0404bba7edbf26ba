//! Hash-gated atomic writer.
//!
//! ## Write protocol
//!
//! 1. Digest the bytes about to be written.
//! 2. Ask the cache → skip if the stored digest is identical (nothing touched).
//! 3. Create the parent directory.
//! 4. Write to `<path>.stitch.tmp`.
//! 5. Rename to final path (atomic on POSIX).
//! 6. Update the cache entry (the caller saves the cache once per run).

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{io_err, SyncError};
use crate::hash_cache::HashCache;
use crate::log_scope::LogScope;

/// Appended to every pretty-printed JSON document we write or hash.
pub const JSON_TRAILING_NEWLINE: &str = "\n";

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; content matches the cached digest.
    Unchanged { path: PathBuf },
    /// Dry-run: the file would have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    /// `true` only when bytes actually reached the disk.
    pub fn wrote(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonStyle {
    pub indent: usize,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Pretty JSON with `style.indent` spaces, plus [`JSON_TRAILING_NEWLINE`].
///
/// This is the exact byte form that is written and hashed.
pub fn canonical_json<T: Serialize + ?Sized>(
    value: &T,
    style: JsonStyle,
) -> Result<Vec<u8>, serde_json::Error> {
    let indent = " ".repeat(style.indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.extend_from_slice(JSON_TRAILING_NEWLINE.as_bytes());
    Ok(out)
}

// ---------------------------------------------------------------------------
// ConditionalWriter
// ---------------------------------------------------------------------------

/// Writes files under `root`, skipping any whose bytes the cache already holds.
pub struct ConditionalWriter<'c> {
    cache: &'c mut HashCache,
    root: PathBuf,
    dry_run: bool,
    scope: LogScope,
}

impl<'c> ConditionalWriter<'c> {
    /// Log records go to `<scope>.write`.
    pub fn new(cache: &'c mut HashCache, root: &Path, scope: &LogScope) -> Self {
        Self {
            cache,
            root: root.to_path_buf(),
            dry_run: false,
            scope: scope.child("write"),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope(&self) -> &LogScope {
        &self.scope
    }

    pub fn write_file_if_changed(
        &mut self,
        path: &Path,
        content: &[u8],
    ) -> Result<WriteResult, SyncError> {
        let tmp = PathBuf::from(format!("{}.stitch.tmp", path.display()));
        self.write_with_tmp(path, content, &tmp)
    }

    pub fn write_json_if_changed<T: Serialize + ?Sized>(
        &mut self,
        path: &Path,
        value: &T,
        style: JsonStyle,
    ) -> Result<WriteResult, SyncError> {
        let bytes = canonical_json(value, style)?;
        self.write_file_if_changed(path, &bytes)
    }

    fn write_with_tmp(
        &mut self,
        path: &Path,
        content: &[u8],
        tmp: &Path,
    ) -> Result<WriteResult, SyncError> {
        if !self.cache.should_write(&self.root, path, content) {
            tracing::debug!(target: self.scope.target(), "unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if self.dry_run {
            tracing::info!(target: self.scope.target(), "[dry-run] would write: {}", path.display());
            return Ok(WriteResult::WouldWrite {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
        if let Err(e) = std::fs::rename(tmp, path) {
            let _ = std::fs::remove_file(tmp);
            return Err(io_err(path, e));
        }

        self.cache.update_hash(&self.root, path, content);

        tracing::info!(target: self.scope.target(), "wrote: {}", path.display());
        Ok(WriteResult::Written {
            path: path.to_path_buf(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
