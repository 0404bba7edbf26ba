//! The narrow seam between the reconcilers and the remote platform.
//!
//! The reconcilers only ever see [`Remote`]; the CLI plugs in an HTTP client,
//! tests plug in an in-memory fake.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use stitch_core::{CoreError, Item, ItemKind};

/// Failure reported by a [`Remote`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One customization as it travels over the wire, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePayload {
    pub kind: ItemKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl WirePayload {
    pub fn from_item(item: &Item) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: item.kind(),
            name: item.name().to_string(),
            object: item.object().map(str::to_string),
            content: item.content().map(str::to_string),
            metadata: serde_json::to_value(item.metadata())?,
        })
    }

    /// Shape the payload into a typed item.
    ///
    /// `name` and `object` from the envelope fill in the metadata when the
    /// remote left them out of it.
    pub fn into_item(self) -> Result<Item, CoreError> {
        let mut metadata = match self.metadata {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                let source = <serde_json::Error as serde::de::Error>::custom(format!(
                    "metadata is not an object: {other}"
                ));
                return Err(CoreError::Metadata {
                    kind: self.kind,
                    source,
                });
            }
        };
        metadata
            .entry("name")
            .or_insert_with(|| Value::String(self.name.clone()));
        if let Some(object) = self.object {
            metadata
                .entry("object")
                .or_insert_with(|| Value::String(object));
        }
        Item::from_parts(self.kind, Value::Object(metadata), self.content)
    }
}

/// Source of remote items and sink for pushed ones.
///
/// Calls are blocking and made one at a time from the reconciler loop.
pub trait Remote {
    /// Every item of `kind` currently defined on the platform.
    fn fetch(&mut self, kind: ItemKind) -> Result<Vec<WirePayload>, RemoteError>;

    /// Create or update one item on the platform.
    fn send(&mut self, payload: &WirePayload) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_fills_missing_metadata_fields() {
        let payload = WirePayload {
            kind: ItemKind::Action,
            name: "Notify Owner".into(),
            object: Some("customers".into()),
            content: Some("run();".into()),
            metadata: json!({"trigger": "after_save"}),
        };
        let item = payload.into_item().unwrap();
        assert_eq!(item.name(), "Notify Owner");
        assert_eq!(item.object(), Some("customers"));
        assert_eq!(item.content(), Some("run();"));
    }

    #[test]
    fn metadata_name_wins_over_envelope() {
        let payload = WirePayload {
            kind: ItemKind::Object,
            name: "envelope".into(),
            object: None,
            content: None,
            metadata: json!({"name": "customers"}),
        };
        assert_eq!(payload.into_item().unwrap().name(), "customers");
    }

    #[test]
    fn non_object_metadata_is_rejected() {
        let payload = WirePayload {
            kind: ItemKind::Report,
            name: "r".into(),
            object: None,
            content: Some("select 1".into()),
            metadata: json!([1, 2]),
        };
        let err = payload.into_item().unwrap_err();
        assert!(matches!(err, CoreError::Metadata { kind: ItemKind::Report, .. }));
    }

    #[test]
    fn payload_json_omits_absent_optionals() {
        let item = Item::from_parts(ItemKind::Object, json!({"name": "customers"}), None).unwrap();
        let payload = WirePayload::from_item(&item).unwrap();
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v, json!({"kind": "object", "name": "customers", "metadata": {"name": "customers"}}));
    }
}
