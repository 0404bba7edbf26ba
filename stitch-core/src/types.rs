//! Domain types for customization artifacts.
//!
//! Every customization kind has its own typed metadata struct. Known fields are
//! typed; anything else the remote platform sends rides along in `extra`, which
//! is flattened back into the JSON on write so forward-compatible fields survive
//! a pull/push round trip.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Directory (relative to the project root) that holds every tracked artifact.
pub const SOURCE_DIR: &str = "src";

/// Passthrough bag for remote fields the typed schema does not know about.
pub type Extra = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The six customization kinds, in pull order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Object,
    Field,
    Action,
    BackendScript,
    Report,
    Page,
}

impl ItemKind {
    /// All kinds in the order a pull processes them.
    pub fn all() -> &'static [ItemKind] {
        &[
            ItemKind::Object,
            ItemKind::Field,
            ItemKind::Action,
            ItemKind::BackendScript,
            ItemKind::Report,
            ItemKind::Page,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Object => "object",
            ItemKind::Field => "field",
            ItemKind::Action => "action",
            ItemKind::BackendScript => "backend-script",
            ItemKind::Report => "report",
            ItemKind::Page => "page",
        }
    }

    /// Human label for a whole category of this kind (`"backend scripts"`).
    pub fn category_label(&self) -> &'static str {
        match self {
            ItemKind::Object => "objects",
            ItemKind::Field => "fields",
            ItemKind::Action => "actions",
            ItemKind::BackendScript => "backend scripts",
            ItemKind::Report => "reports",
            ItemKind::Page => "pages",
        }
    }

    /// The area folder this kind lives under.
    pub fn area(&self) -> Area {
        match self {
            ItemKind::Object | ItemKind::Field | ItemKind::Action => Area::Objects,
            ItemKind::BackendScript => Area::Backend,
            ItemKind::Report => Area::Reports,
            ItemKind::Page => Area::Pages,
        }
    }

    /// Extension of the separate content file, for split kinds.
    pub fn content_extension(&self) -> Option<&'static str> {
        match self {
            ItemKind::Object | ItemKind::Field => None,
            ItemKind::Action | ItemKind::BackendScript => Some("js"),
            ItemKind::Report => Some("sql"),
            ItemKind::Page => Some("html"),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level folders under [`SOURCE_DIR`] that group the item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Objects,
    Backend,
    Reports,
    Pages,
}

impl Area {
    pub fn all() -> &'static [Area] {
        &[Area::Objects, Area::Backend, Area::Reports, Area::Pages]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Objects => "objects",
            Area::Backend => "backend",
            Area::Reports => "reports",
            Area::Pages => "pages",
        }
    }

    /// Project-relative directory, e.g. `src/backend`.
    pub fn dir(&self) -> String {
        format!("{SOURCE_DIR}/{}", self.as_str())
    }

    /// Attribute a project-relative path to an area by substring match.
    ///
    /// Checks `/objects/`, `/backend/`, `/reports/`, `/pages/` in that order.
    pub fn from_path_substring(rel: &str) -> Option<Area> {
        let padded = format!("/{rel}");
        Area::all()
            .iter()
            .copied()
            .find(|area| padded.contains(&format!("/{}/", area.as_str())))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Metadata structs
// ---------------------------------------------------------------------------

/// `src/objects/<object>/definition.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `src/objects/<object>/fields/<field>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub object: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `src/objects/<object>/actions/<action>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub name: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `src/backend/<script>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendScriptMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `src/reports/<report>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `src/pages/<page>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// One customization artifact, in its local representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Object(ObjectDefinition),
    Field(FieldDefinition),
    Action {
        metadata: ActionMetadata,
        code: String,
    },
    BackendScript {
        metadata: BackendScriptMetadata,
        code: String,
    },
    Report {
        metadata: ReportMetadata,
        sql: String,
    },
    Page {
        metadata: PageMetadata,
        html: String,
    },
}

/// Borrowed view of an item's metadata, serialized exactly as the struct it wraps.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum MetadataRef<'a> {
    Object(&'a ObjectDefinition),
    Field(&'a FieldDefinition),
    Action(&'a ActionMetadata),
    BackendScript(&'a BackendScriptMetadata),
    Report(&'a ReportMetadata),
    Page(&'a PageMetadata),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Object(_) => ItemKind::Object,
            Item::Field(_) => ItemKind::Field,
            Item::Action { .. } => ItemKind::Action,
            Item::BackendScript { .. } => ItemKind::BackendScript,
            Item::Report { .. } => ItemKind::Report,
            Item::Page { .. } => ItemKind::Page,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Object(m) => &m.name,
            Item::Field(m) => &m.name,
            Item::Action { metadata, .. } => &metadata.name,
            Item::BackendScript { metadata, .. } => &metadata.name,
            Item::Report { metadata, .. } => &metadata.name,
            Item::Page { metadata, .. } => &metadata.name,
        }
    }

    /// Owning object, for kinds nested under an object.
    pub fn object(&self) -> Option<&str> {
        match self {
            Item::Field(m) => Some(&m.object),
            Item::Action { metadata, .. } => Some(&metadata.object),
            _ => None,
        }
    }

    /// Script body, SQL text, or HTML; `None` for pure-JSON kinds.
    pub fn content(&self) -> Option<&str> {
        match self {
            Item::Object(_) | Item::Field(_) => None,
            Item::Action { code, .. } | Item::BackendScript { code, .. } => Some(code),
            Item::Report { sql, .. } => Some(sql),
            Item::Page { html, .. } => Some(html),
        }
    }

    pub fn metadata(&self) -> MetadataRef<'_> {
        match self {
            Item::Object(m) => MetadataRef::Object(m),
            Item::Field(m) => MetadataRef::Field(m),
            Item::Action { metadata, .. } => MetadataRef::Action(metadata),
            Item::BackendScript { metadata, .. } => MetadataRef::BackendScript(metadata),
            Item::Report { metadata, .. } => MetadataRef::Report(metadata),
            Item::Page { metadata, .. } => MetadataRef::Page(metadata),
        }
    }

    /// Assemble an item from its metadata JSON and (for split kinds) content.
    ///
    /// Content is ignored for pure-JSON kinds and required for split kinds.
    pub fn from_parts(
        kind: ItemKind,
        metadata: Value,
        content: Option<String>,
    ) -> Result<Item, CoreError> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: ItemKind,
            metadata: Value,
        ) -> Result<T, CoreError> {
            serde_json::from_value(metadata).map_err(|source| CoreError::Metadata { kind, source })
        }

        fn require(
            kind: ItemKind,
            name: &str,
            content: Option<String>,
        ) -> Result<String, CoreError> {
            content.ok_or_else(|| CoreError::MissingContent {
                kind,
                name: name.to_string(),
                expected: kind.content_extension().unwrap_or("content"),
            })
        }

        let item = match kind {
            ItemKind::Object => Item::Object(parse(kind, metadata)?),
            ItemKind::Field => Item::Field(parse(kind, metadata)?),
            ItemKind::Action => {
                let metadata: ActionMetadata = parse(kind, metadata)?;
                let code = require(kind, &metadata.name, content)?;
                Item::Action { metadata, code }
            }
            ItemKind::BackendScript => {
                let metadata: BackendScriptMetadata = parse(kind, metadata)?;
                let code = require(kind, &metadata.name, content)?;
                Item::BackendScript { metadata, code }
            }
            ItemKind::Report => {
                let metadata: ReportMetadata = parse(kind, metadata)?;
                let sql = require(kind, &metadata.name, content)?;
                Item::Report { metadata, sql }
            }
            ItemKind::Page => {
                let metadata: PageMetadata = parse(kind, metadata)?;
                let html = require(kind, &metadata.name, content)?;
                Item::Page { metadata, html }
            }
        };
        Ok(item)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_display_and_area() {
        assert_eq!(ItemKind::BackendScript.to_string(), "backend-script");
        assert_eq!(ItemKind::Action.area(), Area::Objects);
        assert_eq!(ItemKind::Page.area(), Area::Pages);
        assert_eq!(Area::Reports.dir(), "src/reports");
    }

    #[test]
    fn kind_serde_uses_kebab_case() {
        let s = serde_json::to_string(&ItemKind::BackendScript).unwrap();
        assert_eq!(s, "\"backend-script\"");
        let k: ItemKind = serde_json::from_str("\"field\"").unwrap();
        assert_eq!(k, ItemKind::Field);
    }

    #[test]
    fn area_substring_attribution() {
        assert_eq!(
            Area::from_path_substring("src/objects/customers/definition.json"),
            Some(Area::Objects)
        );
        assert_eq!(Area::from_path_substring("src/backend/sync.js"), Some(Area::Backend));
        assert_eq!(Area::from_path_substring("README.md"), None);
        // First listed area wins.
        assert_eq!(
            Area::from_path_substring("src/pages/objects/x.json"),
            Some(Area::Objects)
        );
    }

    #[test]
    fn extra_fields_survive_roundtrip() {
        let raw = json!({
            "name": "customers",
            "label": "Customers",
            "icon": "users",
            "sharing": {"mode": "private"}
        });
        let def: ObjectDefinition = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(def.extra.get("icon"), Some(&json!("users")));
        assert_eq!(serde_json::to_value(&def).unwrap(), raw);
    }

    #[test]
    fn from_parts_builds_split_item() {
        let item = Item::from_parts(
            ItemKind::Report,
            json!({"name": "Revenue", "title": "Revenue by month"}),
            Some("select 1;".to_string()),
        )
        .unwrap();
        assert_eq!(item.kind(), ItemKind::Report);
        assert_eq!(item.name(), "Revenue");
        assert_eq!(item.content(), Some("select 1;"));
    }

    #[test]
    fn from_parts_requires_content_for_split_kinds() {
        let err = Item::from_parts(ItemKind::Page, json!({"name": "home"}), None).unwrap_err();
        assert!(matches!(err, CoreError::MissingContent { .. }), "got: {err}");
        assert!(err.to_string().contains("html"));
    }

    #[test]
    fn from_parts_rejects_bad_metadata() {
        let err = Item::from_parts(ItemKind::Field, json!({"name": "email"}), None).unwrap_err();
        assert!(matches!(err, CoreError::Metadata { kind: ItemKind::Field, .. }));
    }

    #[test]
    fn metadata_ref_serializes_like_struct() {
        let item = Item::Field(FieldDefinition {
            name: "email".into(),
            object: "customers".into(),
            field_type: "text".into(),
            label: None,
            required: true,
            extra: Extra::new(),
        });
        let v = serde_json::to_value(item.metadata()).unwrap();
        assert_eq!(
            v,
            json!({"name": "email", "object": "customers", "type": "text", "required": true})
        );
        assert_eq!(item.object(), Some("customers"));
    }
}
