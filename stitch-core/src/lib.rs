//! Core library for stitch: domain types, artifact layout and project config.
//!
//! Public API surface:
//! - [`types`]: item kinds, typed metadata, [`Item`]
//! - [`artifact`]: path layout, path-shape classification, name sanitization
//! - [`project`]: `.stitch/config.yaml` load / save / init, root discovery
//! - [`error`]: [`CoreError`]

pub mod artifact;
pub mod error;
pub mod project;
pub mod types;

pub use artifact::{sanitize_name, Artifact};
pub use error::CoreError;
pub use project::ProjectConfig;
pub use types::{
    ActionMetadata, Area, BackendScriptMetadata, FieldDefinition, Item, ItemKind, MetadataRef,
    ObjectDefinition, PageMetadata, ReportMetadata, SOURCE_DIR,
};
