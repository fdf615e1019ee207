//! MCP Apps (SEP-1865) metadata linking tools to UI resources.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{JsonObject, Meta, ResourceContents, Tool};

/// The MCP Apps extension identifier, advertised in server capabilities
pub const EXTENSION_ID: &str = "io.modelcontextprotocol/ui";

/// The MIME type for MCP App HTML resources
pub const RESOURCE_MIME_TYPE: &str = super::mime::MIME_TYPE_MCP_APP;

/// The `_meta` key holding UI metadata on tools and resource contents
pub const UI_META_KEY: &str = "ui";

/// The flat `_meta` key used before `_meta.ui` existed
pub const RESOURCE_URI_META_KEY: &str = "ui/resourceUri";

/// Who may call a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// The model may call the tool
    Model,
    /// The embedded view may call the tool through the host
    App,
}

/// The default visibility when a tool does not declare one.
pub fn default_visibility() -> Vec<Visibility> {
    vec![Visibility::Model, Visibility::App]
}

/// `_meta.ui` on a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiToolMeta {
    pub resource_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<Visibility>>,
}

impl UiToolMeta {
    pub fn new(resource_uri: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Vec<Visibility>) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Render as a tool `_meta` carrying both the nested and the legacy key.
    pub fn to_meta(&self) -> Meta {
        let mut meta = Meta::new();
        meta.insert(
            UI_META_KEY.to_string(),
            serde_json::to_value(self).unwrap_or_else(|_| Value::Object(JsonObject::new())),
        );
        meta.insert(
            RESOURCE_URI_META_KEY.to_string(),
            Value::String(self.resource_uri.clone()),
        );
        meta
    }
}

/// Content Security Policy domain allowlists for a UI resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiResourceCsp {
    /// Origins for fetch, XHR and WebSocket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_domains: Option<Vec<String>>,
    /// Origins for scripts, styles, images, media and fonts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_domains: Option<Vec<String>>,
    /// Origins for nested frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri_domains: Option<Vec<String>>,
}

/// Browser capabilities a view asks the host to delegate to its iframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPermissions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microphone: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipboard_write: Option<JsonObject>,
}

/// `_meta.ui` on resource contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiResourceMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csp: Option<UiResourceCsp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<UiPermissions>,
    /// Dedicated sandbox origin requested by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefers_border: Option<bool>,
}

impl UiResourceMeta {
    pub fn with_csp(mut self, csp: UiResourceCsp) -> Self {
        self.csp = Some(csp);
        self
    }

    pub fn with_permissions(mut self, permissions: UiPermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn with_border(mut self, prefers_border: bool) -> Self {
        self.prefers_border = Some(prefers_border);
        self
    }

    pub fn to_meta(&self) -> Meta {
        let mut meta = Meta::new();
        if let Ok(value) = serde_json::to_value(self) {
            meta.insert(UI_META_KEY.to_string(), value);
        }
        meta
    }

    pub fn from_contents(contents: &ResourceContents) -> Option<Self> {
        let value = contents.meta()?.get(UI_META_KEY)?;
        match serde_json::from_value(value.clone()) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(uri = %contents.uri(), error = %e, "ignoring malformed _meta.ui");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Inline,
    Fullscreen,
    Pip,
}

/// The UI resource a tool renders into, if any.
///
/// `_meta.ui.resourceUri` wins over the legacy `_meta["ui/resourceUri"]`.
pub fn tool_ui_resource_uri(tool: &Tool) -> Option<String> {
    let meta = tool.meta.as_ref()?;
    meta.get_path(&[UI_META_KEY, "resourceUri"])
        .or_else(|| meta.get(RESOURCE_URI_META_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// The declared visibility of a tool, defaulting to model and app.
pub fn tool_visibility(tool: &Tool) -> Vec<Visibility> {
    tool.meta
        .as_ref()
        .and_then(|meta| meta.get_path(&[UI_META_KEY, "visibility"]))
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_else(default_visibility)
}

/// Make the nested and the legacy resource URI keys agree.
///
/// When only one of them is present the other is filled in. When both are
/// present the nested key is kept as the source of truth.
pub fn normalize_tool_meta(meta: &mut Meta) {
    let nested = meta
        .get_path(&[UI_META_KEY, "resourceUri"])
        .and_then(Value::as_str)
        .map(str::to_string);
    let legacy = meta
        .get(RESOURCE_URI_META_KEY)
        .and_then(Value::as_str)
        .map(str::to_string);
    match (nested, legacy) {
        (Some(uri), _) => {
            meta.insert(RESOURCE_URI_META_KEY.to_string(), Value::String(uri));
        }
        (None, Some(uri)) => {
            let ui = meta
                .entry(UI_META_KEY.to_string())
                .or_insert_with(|| Value::Object(JsonObject::new()));
            if let Some(ui) = ui.as_object_mut() {
                ui.insert("resourceUri".to_string(), Value::String(uri));
            } else {
                tracing::warn!("_meta.ui is not an object, leaving legacy key only");
            }
        }
        (None, None) => {}
    }
}
