//! On-disk layout of customization artifacts.
//!
//! # Path mapping
//!
//! | Kind           | Metadata file                          | Content file                       |
//! |----------------|----------------------------------------|------------------------------------|
//! | Object         | `src/objects/<o>/definition.json`      | (none)                             |
//! | Field          | `src/objects/<o>/fields/<f>.json`      | (none)                             |
//! | Action         | `src/objects/<o>/actions/<a>.json`     | `src/objects/<o>/actions/<a>.js`   |
//! | Backend script | `src/backend/<n>.json`                 | `src/backend/<n>.js`               |
//! | Report         | `src/reports/<n>.json`                 | `src/reports/<n>.sql`              |
//! | Page           | `src/pages/<n>.json`                   | `src/pages/<n>.html`               |
//!
//! Every `<…>` segment is a sanitized name (see [`sanitize_name`]). All paths are
//! project-relative and `/`-separated.

use crate::error::CoreError;
use crate::types::{Item, ItemKind, SOURCE_DIR};

const METADATA_EXT: &str = "json";
const OBJECT_DEFINITION_FILE: &str = "definition.json";

/// Lower-case `name`, collapse every run of non-alphanumeric characters into a
/// single `-`, and strip leading/trailing `-`.
///
/// Returns [`CoreError::InvalidName`] when nothing is left.
pub fn sanitize_name(name: &str) -> Result<String, CoreError> {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        return Err(CoreError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(out)
}

/// What a project-relative path is, judged purely by its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Artifact {
    Object { object: String },
    Action { object: String, name: String },
    Field { object: String, name: String },
    BackendScript { name: String },
    Report { name: String },
    Page { name: String },
    Unrecognized,
}

impl Artifact {
    /// Classify a project-relative path.
    ///
    /// Rules are tried in priority order: action, field, object definition,
    /// backend script, report, page. Both halves of a split artifact (content
    /// and metadata) classify to the same value.
    pub fn classify(rel: &str) -> Artifact {
        let segments: Vec<&str> = rel.split('/').collect();
        if segments.iter().any(|s| s.is_empty() || s.starts_with('.')) {
            return Artifact::Unrecognized;
        }

        match segments.as_slice() {
            [SOURCE_DIR, "objects", object, "actions", file] => {
                match stem_with_ext(file, &["js", METADATA_EXT]) {
                    Some(name) => Artifact::Action {
                        object: object.to_string(),
                        name: name.to_string(),
                    },
                    None => Artifact::Unrecognized,
                }
            }
            [SOURCE_DIR, "objects", object, "fields", file] => {
                match stem_with_ext(file, &[METADATA_EXT]) {
                    Some(name) => Artifact::Field {
                        object: object.to_string(),
                        name: name.to_string(),
                    },
                    None => Artifact::Unrecognized,
                }
            }
            [SOURCE_DIR, "objects", object, OBJECT_DEFINITION_FILE] => Artifact::Object {
                object: object.to_string(),
            },
            [SOURCE_DIR, "backend", file] => match stem_with_ext(file, &["js", METADATA_EXT]) {
                Some(name) => Artifact::BackendScript {
                    name: name.to_string(),
                },
                None => Artifact::Unrecognized,
            },
            [SOURCE_DIR, "reports", file] => match stem_with_ext(file, &["sql", METADATA_EXT]) {
                Some(name) => Artifact::Report {
                    name: name.to_string(),
                },
                None => Artifact::Unrecognized,
            },
            [SOURCE_DIR, "pages", file] => match stem_with_ext(file, &["html", METADATA_EXT]) {
                Some(name) => Artifact::Page {
                    name: name.to_string(),
                },
                None => Artifact::Unrecognized,
            },
            _ => Artifact::Unrecognized,
        }
    }

    /// Where `item` lives on disk, using sanitized names.
    pub fn for_item(item: &Item) -> Result<Artifact, CoreError> {
        let name = sanitize_name(item.name())?;
        let artifact = match item {
            Item::Object(_) => Artifact::Object { object: name },
            Item::Field(m) => Artifact::Field {
                object: sanitize_name(&m.object)?,
                name,
            },
            Item::Action { metadata, .. } => Artifact::Action {
                object: sanitize_name(&metadata.object)?,
                name,
            },
            Item::BackendScript { .. } => Artifact::BackendScript { name },
            Item::Report { .. } => Artifact::Report { name },
            Item::Page { .. } => Artifact::Page { name },
        };
        Ok(artifact)
    }

    pub fn kind(&self) -> Option<ItemKind> {
        match self {
            Artifact::Object { .. } => Some(ItemKind::Object),
            Artifact::Action { .. } => Some(ItemKind::Action),
            Artifact::Field { .. } => Some(ItemKind::Field),
            Artifact::BackendScript { .. } => Some(ItemKind::BackendScript),
            Artifact::Report { .. } => Some(ItemKind::Report),
            Artifact::Page { .. } => Some(ItemKind::Page),
            Artifact::Unrecognized => None,
        }
    }

    /// Project-relative path of the metadata JSON.
    pub fn metadata_path(&self) -> Option<String> {
        match self {
            Artifact::Object { object } => {
                Some(format!("{SOURCE_DIR}/objects/{object}/{OBJECT_DEFINITION_FILE}"))
            }
            Artifact::Unrecognized => None,
            _ => self.base_path().map(|base| format!("{base}.{METADATA_EXT}")),
        }
    }

    /// Project-relative path of the content file, for split kinds.
    pub fn content_path(&self) -> Option<String> {
        let ext = self.kind()?.content_extension()?;
        self.base_path().map(|base| format!("{base}.{ext}"))
    }

    /// Every file that makes up this artifact: content first, then metadata.
    pub fn files(&self) -> Vec<String> {
        self.content_path()
            .into_iter()
            .chain(self.metadata_path())
            .collect()
    }

    fn base_path(&self) -> Option<String> {
        match self {
            Artifact::Action { object, name } => {
                Some(format!("{SOURCE_DIR}/objects/{object}/actions/{name}"))
            }
            Artifact::Field { object, name } => {
                Some(format!("{SOURCE_DIR}/objects/{object}/fields/{name}"))
            }
            Artifact::BackendScript { name } => Some(format!("{SOURCE_DIR}/backend/{name}")),
            Artifact::Report { name } => Some(format!("{SOURCE_DIR}/reports/{name}")),
            Artifact::Page { name } => Some(format!("{SOURCE_DIR}/pages/{name}")),
            Artifact::Object { .. } | Artifact::Unrecognized => None,
        }
    }
}

fn stem_with_ext<'a>(file: &'a str, allowed: &[&str]) -> Option<&'a str> {
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || !allowed.contains(&ext) {
        return None;
    }
    Some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize_name("Customer Orders").unwrap(), "customer-orders");
        assert_eq!(sanitize_name("  --Send_Email!!now-- ").unwrap(), "send-email-now");
        assert_eq!(sanitize_name("v2.Report").unwrap(), "v2-report");
        assert_eq!(sanitize_name("already-clean").unwrap(), "already-clean");
    }

    #[test]
    fn sanitize_is_stable_on_its_own_output() {
        let once = sanitize_name("Über Fancy / Name").unwrap();
        assert_eq!(sanitize_name(&once).unwrap(), once);
    }

    #[test]
    fn sanitize_rejects_empty_result() {
        let err = sanitize_name("!!!").unwrap_err();
        assert!(matches!(err, CoreError::InvalidName { .. }));
    }

    #[test]
    fn action_rule_wins_over_object_rule() {
        assert_eq!(
            Artifact::classify("src/objects/customers/actions/notify.js"),
            Artifact::Action {
                object: "customers".into(),
                name: "notify".into()
            }
        );
        assert_eq!(
            Artifact::classify("src/objects/customers/definition.json"),
            Artifact::Object {
                object: "customers".into()
            }
        );
    }

    #[test]
    fn unknown_shapes_are_unrecognized() {
        for rel in [
            "src/objects/customers/notes.txt",
            "src/objects/customers/fields/email.js",
            "src/backend/nested/job.js",
            "src/reports/.hidden.sql",
            "src/pages/index.css",
            "README.md",
            "src/objects/customers/actions/.json",
        ] {
            assert_eq!(Artifact::classify(rel), Artifact::Unrecognized, "{rel}");
        }
    }

    #[test]
    fn both_halves_classify_to_same_artifact() {
        let a = Artifact::classify("src/reports/revenue.sql");
        let b = Artifact::classify("src/reports/revenue.json");
        assert_eq!(a, b);
        assert_eq!(
            a.files(),
            vec!["src/reports/revenue.sql", "src/reports/revenue.json"]
        );
    }

    #[test]
    fn object_has_metadata_only() {
        let a = Artifact::Object {
            object: "customers".into(),
        };
        assert_eq!(a.content_path(), None);
        assert_eq!(a.files(), vec!["src/objects/customers/definition.json"]);
    }
}
