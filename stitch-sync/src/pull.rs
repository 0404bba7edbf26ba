//! Pull reconciler: remote → local files, one category at a time.
//!
//! For each kind in [`ItemKind::all`] order the remote listing is fetched, every
//! item is shaped and written through the [`ConditionalWriter`], and the outcome
//! is tallied. Item failures are recorded and the loop moves on; a failed fetch
//! ends the run after the cache is saved for what was already written.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use stitch_core::{Artifact, Item, ItemKind};

use crate::error::{ItemError, SyncError};
use crate::hash_cache::HashCache;
use crate::log_scope::LogScope;
use crate::outcome::{ItemFailure, RunStatus};
use crate::remote::{Remote, WirePayload};
use crate::writer::{ConditionalWriter, JsonStyle, WriteResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullOptions {
    /// Report what would be written without touching disk or cache.
    pub dry_run: bool,
}

/// Outcome of pulling one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    pub kind: ItemKind,
    pub success: bool,
    /// Items processed without error.
    pub count: usize,
    /// Files written (or, in dry-run, that would be written).
    pub written: usize,
    pub unchanged: usize,
    pub errors: Vec<ItemFailure>,
    #[serde(skip)]
    pub writes: Vec<WriteResult>,
}

impl CategoryResult {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            success: true,
            count: 0,
            written: 0,
            unchanged: 0,
            errors: Vec::new(),
            writes: Vec::new(),
        }
    }

    fn record_writes(&mut self, writes: Vec<WriteResult>) {
        for write in &writes {
            match write {
                WriteResult::Unchanged { .. } => self.unchanged += 1,
                WriteResult::Written { .. } | WriteResult::WouldWrite { .. } => self.written += 1,
            }
        }
        self.writes.extend(writes);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PullResult {
    pub dry_run: bool,
    pub categories: Vec<CategoryResult>,
}

impl PullResult {
    pub fn success(&self) -> bool {
        self.categories.iter().all(|c| c.success)
    }

    pub fn written(&self) -> usize {
        self.categories.iter().map(|c| c.written).sum()
    }

    pub fn unchanged(&self) -> usize {
        self.categories.iter().map(|c| c.unchanged).sum()
    }

    pub fn error_count(&self) -> usize {
        self.categories.iter().map(|c| c.errors.len()).sum()
    }

    pub fn status(&self) -> RunStatus {
        if !self.success() {
            RunStatus::Partial
        } else if self.written() == 0 {
            RunStatus::NothingToDo
        } else {
            RunStatus::Complete
        }
    }
}

/// Pull every category from `remote` into the project at `root`.
pub fn pull(
    root: &Path,
    remote: &mut dyn Remote,
    options: PullOptions,
    scope: &LogScope,
) -> Result<PullResult, SyncError> {
    let scope = scope.child("pull");
    let started_at = Utc::now();
    let mut cache = HashCache::open(root, &scope);
    let mut categories = Vec::with_capacity(ItemKind::all().len());

    for kind in ItemKind::all() {
        let category_scope = scope.child(kind.as_str());
        let payloads = match remote.fetch(*kind) {
            Ok(payloads) => payloads,
            Err(source) => {
                tracing::error!(target: category_scope.target(), "fetch failed: {source}");
                if !options.dry_run {
                    cache.save();
                }
                return Err(SyncError::Fetch {
                    kind: *kind,
                    source,
                });
            }
        };
        tracing::info!(
            target: category_scope.target(),
            "fetched {} {}",
            payloads.len(),
            kind.category_label()
        );

        let mut writer =
            ConditionalWriter::new(&mut cache, root, &category_scope).dry_run(options.dry_run);
        categories.push(pull_category(&mut writer, *kind, payloads, &category_scope));
    }

    if !options.dry_run {
        cache.mark_synced(started_at);
        cache.save();
    }

    Ok(PullResult {
        dry_run: options.dry_run,
        categories,
    })
}

fn pull_category(
    writer: &mut ConditionalWriter<'_>,
    kind: ItemKind,
    payloads: Vec<WirePayload>,
    scope: &LogScope,
) -> CategoryResult {
    let mut result = CategoryResult::new(kind);
    for payload in payloads {
        let name = payload.name.clone();
        let outcome = if payload.kind == kind {
            shape(payload).and_then(|(item, artifact)| write_item(writer, &item, &artifact))
        } else {
            Err(ItemError::KindMismatch {
                expected: kind,
                found: payload.kind,
            })
        };
        match outcome {
            Ok(writes) => {
                result.count += 1;
                result.record_writes(writes);
            }
            Err(err) => {
                tracing::warn!(target: scope.target(), "{kind} '{name}': {err}");
                result.errors.push(ItemFailure::new(format!("{kind} '{name}': {err}")));
            }
        }
    }
    result.success = result.errors.is_empty();
    result
}

/// Typed item plus where it lives on disk.
pub(crate) fn shape(payload: WirePayload) -> Result<(Item, Artifact), ItemError> {
    let item = payload.into_item()?;
    let artifact = Artifact::for_item(&item)?;
    Ok((item, artifact))
}

fn write_item(
    writer: &mut ConditionalWriter<'_>,
    item: &Item,
    artifact: &Artifact,
) -> Result<Vec<WriteResult>, ItemError> {
    let root = writer.root().to_path_buf();
    let mut writes = Vec::with_capacity(2);
    if let (Some(rel), Some(content)) = (artifact.content_path(), item.content()) {
        writes.push(writer.write_file_if_changed(&root.join(rel), content.as_bytes())?);
    }
    if let Some(rel) = artifact.metadata_path() {
        writes.push(writer.write_json_if_changed(
            &root.join(rel),
            &item.metadata(),
            JsonStyle::default(),
        )?);
    }
    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Listing {
        items: HashMap<ItemKind, Vec<WirePayload>>,
        fail_on: Option<ItemKind>,
        fetched: Vec<ItemKind>,
    }

    impl Remote for Listing {
        fn fetch(&mut self, kind: ItemKind) -> Result<Vec<WirePayload>, RemoteError> {
            self.fetched.push(kind);
            if self.fail_on == Some(kind) {
                return Err(RemoteError::new("503 service unavailable"));
            }
            Ok(self.items.get(&kind).cloned().unwrap_or_default())
        }

        fn send(&mut self, _payload: &WirePayload) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    fn payload(kind: ItemKind, name: &str, content: Option<&str>, metadata: serde_json::Value) -> WirePayload {
        WirePayload {
            kind,
            name: name.into(),
            object: None,
            content: content.map(str::to_string),
            metadata,
        }
    }

    #[test]
    fn categories_are_fetched_in_fixed_order() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing::default();
        let result = pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap();
        assert_eq!(remote.fetched, ItemKind::all());
        assert_eq!(result.status(), RunStatus::NothingToDo);
    }

    #[test]
    fn writes_content_and_metadata_under_sanitized_names() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing::default();
        remote.items.insert(
            ItemKind::Report,
            vec![payload(ItemKind::Report, "Monthly Revenue", Some("select 1;"), json!({"title": "Revenue"}))],
        );
        let result = pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap();

        let sql = tmp.path().join("src/reports/monthly-revenue.sql");
        let meta = tmp.path().join("src/reports/monthly-revenue.json");
        assert_eq!(std::fs::read_to_string(sql).unwrap(), "select 1;");
        let meta: serde_json::Value = serde_json::from_slice(&std::fs::read(meta).unwrap()).unwrap();
        assert_eq!(meta, json!({"name": "Monthly Revenue", "title": "Revenue"}));

        let reports = &result.categories[4];
        assert_eq!(reports.kind, ItemKind::Report);
        assert_eq!((reports.count, reports.written, reports.unchanged), (1, 2, 0));
        assert_eq!(result.status(), RunStatus::Complete);
    }

    #[test]
    fn second_pull_is_all_unchanged() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing::default();
        remote.items.insert(
            ItemKind::Page,
            vec![payload(ItemKind::Page, "home", Some("<h1>hi</h1>"), json!({}))],
        );
        pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap();
        let again = pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap();
        assert_eq!(again.written(), 0);
        assert_eq!(again.unchanged(), 2);
        assert_eq!(again.status(), RunStatus::NothingToDo);
    }

    #[test]
    fn bad_item_does_not_stop_category() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing::default();
        remote.items.insert(
            ItemKind::BackendScript,
            vec![
                payload(ItemKind::BackendScript, "!!!", Some("a"), json!({})),
                payload(ItemKind::BackendScript, "no-code", None, json!({})),
                payload(ItemKind::BackendScript, "good", Some("b"), json!({})),
            ],
        );
        let result = pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap();
        let backend = &result.categories[3];
        assert!(!backend.success);
        assert_eq!(backend.count, 1);
        assert_eq!(backend.errors.len(), 2);
        assert!(backend.errors[1].message.contains("no-code"));
        assert!(tmp.path().join("src/backend/good.js").exists());
        assert_eq!(result.status(), RunStatus::Partial);
    }

    #[test]
    fn fetch_failure_is_fatal_but_saves_earlier_work() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing {
            fail_on: Some(ItemKind::Action),
            ..Listing::default()
        };
        remote.items.insert(
            ItemKind::Object,
            vec![payload(ItemKind::Object, "customers", None, json!({}))],
        );
        let err = pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap_err();
        assert!(matches!(err, SyncError::Fetch { kind: ItemKind::Action, .. }));
        assert!(err.to_string().contains("actions"));

        let cache = HashCache::open(tmp.path(), &LogScope::default());
        assert!(cache.hash_of("src/objects/customers/definition.json").is_some());
        assert!(cache.synced_at().is_none(), "aborted run is not stamped");
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing::default();
        remote.items.insert(
            ItemKind::Object,
            vec![payload(ItemKind::Object, "customers", None, json!({}))],
        );
        let result = pull(tmp.path(), &mut remote, PullOptions { dry_run: true }, &LogScope::default()).unwrap();
        assert!(result.dry_run);
        assert_eq!(result.written(), 1);
        assert!(!tmp.path().join("src").exists());
        assert!(!stitch_core::project::hash_cache_path(tmp.path()).exists());
    }

    #[test]
    fn mismatched_kind_is_an_item_error() {
        let tmp = TempDir::new().unwrap();
        let mut remote = Listing::default();
        remote.items.insert(
            ItemKind::Page,
            vec![payload(ItemKind::Report, "stray", Some("select 1"), json!({}))],
        );
        let result = pull(tmp.path(), &mut remote, PullOptions::default(), &LogScope::default()).unwrap();
        assert_eq!(result.categories[5].errors.len(), 1);
        assert!(!tmp.path().join("src/reports").exists());
    }
}
