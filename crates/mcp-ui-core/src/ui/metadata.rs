use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{JsonObject, Meta};

/// Every UI hint is stored in `_meta` under this prefix.
pub const UI_METADATA_PREFIX: &str = "mcpui.dev/ui-";

const PREFERRED_FRAME_SIZE: &str = "preferred-frame-size";
const INITIAL_RENDER_DATA: &str = "initial-render-data";

/// Rendering hints attached to an mcp-ui resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiMetadata {
    /// CSS width and height, e.g. `["800px", "600px"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_frame_size: Option<[String; 2]>,
    /// Data handed to the view once it reports ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_render_data: Option<Value>,
    /// Any other hint, keyed without the prefix
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub extra: JsonObject,
}

impl UiMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferred_frame_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.preferred_frame_size = Some([width.into(), height.into()]);
        self
    }

    pub fn initial_render_data(mut self, data: Value) -> Self {
        self.initial_render_data = Some(data);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.preferred_frame_size.is_none()
            && self.initial_render_data.is_none()
            && self.extra.is_empty()
    }

    /// Render the hints as prefixed `_meta` entries.
    pub fn to_meta(&self) -> Meta {
        let mut meta = Meta::new();
        if let Some(size) = &self.preferred_frame_size {
            meta.insert(
                format!("{UI_METADATA_PREFIX}{PREFERRED_FRAME_SIZE}"),
                Value::Array(size.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(data) = &self.initial_render_data {
            meta.insert(
                format!("{UI_METADATA_PREFIX}{INITIAL_RENDER_DATA}"),
                data.clone(),
            );
        }
        for (key, value) in &self.extra {
            meta.insert(format!("{UI_METADATA_PREFIX}{key}"), value.clone());
        }
        meta
    }

    /// Collect the prefixed entries of `meta`; other keys are ignored.
    pub fn from_meta(meta: &Meta) -> Self {
        let mut metadata = UiMetadata::default();
        for (key, value) in meta.iter() {
            let Some(name) = key.strip_prefix(UI_METADATA_PREFIX) else {
                continue;
            };
            match name {
                PREFERRED_FRAME_SIZE => {
                    match serde_json::from_value::<[String; 2]>(value.clone()) {
                        Ok(size) => metadata.preferred_frame_size = Some(size),
                        Err(e) => {
                            tracing::warn!(error = %e, "ignoring malformed preferred-frame-size")
                        }
                    }
                }
                INITIAL_RENDER_DATA => metadata.initial_render_data = Some(value.clone()),
                other => {
                    metadata.extra.insert(other.to_string(), value.clone());
                }
            }
        }
        metadata
    }
}
