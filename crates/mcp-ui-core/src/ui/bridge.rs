//! JSON-RPC messages exchanged between a host and an MCP Apps view.
//!
//! The view runs inside a sandbox proxy iframe; everything it needs from the
//! MCP server flows through the host over this bridge.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::apps::{DisplayMode, UiPermissions, UiResourceCsp};
use crate::model::JsonObject;

pub const LATEST_PROTOCOL_VERSION: &str = "2025-11-21";

/// Bridge protocol versions a host can speak, oldest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", LATEST_PROTOCOL_VERSION];

pub mod methods {
    // requests
    pub const INITIALIZE: &str = "ui/initialize";
    pub const OPEN_LINK: &str = "ui/open-link";
    pub const MESSAGE: &str = "ui/message";
    pub const REQUEST_DISPLAY_MODE: &str = "ui/request-display-mode";
    pub const UPDATE_MODEL_CONTEXT: &str = "ui/update-model-context";
    pub const RESOURCE_TEARDOWN: &str = "ui/resource-teardown";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const RESOURCES_READ: &str = "resources/read";
    pub const PING: &str = "ping";

    // notifications
    pub const INITIALIZED: &str = "ui/notifications/initialized";
    pub const TOOL_INPUT_PARTIAL: &str = "ui/notifications/tool-input-partial";
    pub const TOOL_INPUT: &str = "ui/notifications/tool-input";
    pub const TOOL_RESULT: &str = "ui/notifications/tool-result";
    pub const TOOL_CANCELLED: &str = "ui/notifications/tool-cancelled";
    pub const SIZE_CHANGED: &str = "ui/notifications/size-changed";
    pub const HOST_CONTEXT_CHANGED: &str = "ui/notifications/host-context-changed";

    // sandbox proxy
    pub const SANDBOX_PROXY_READY: &str = "ui/notifications/sandbox-proxy-ready";
    pub const SANDBOX_RESOURCE_READY: &str = "ui/notifications/sandbox-resource-ready";
}

/// Pick the version to speak given what the view asked for.
///
/// A known version is accepted as is; anything else falls back to the latest.
pub fn negotiate_protocol_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
        .copied()
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Capabilities declared by a view during initialization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpUiAppCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_display_modes: Option<Vec<DisplayMode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiInitializeParams {
    pub protocol_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_capabilities: Option<McpUiAppCapabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<AppInfo>,
}

/// What the host lets a view do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_links: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_tools: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_resources: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiInitializeResult {
    pub protocol_version: String,
    pub host_capabilities: HostCapabilities,
    pub host_info: AppInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_context: Option<HostContext>,
}

/// The host environment as seen by a view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_display_modes: Option<Vec<DisplayMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_dimensions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputParams {
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolCancelledParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenLinkParams {
    pub url: String,
}

/// A message the view wants injected into the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageParams {
    pub role: String,
    pub content: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDisplayModeParams {
    pub mode: DisplayMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDisplayModeResult {
    pub mode: DisplayMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModelContextParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

/// CSS pixels; browsers may report fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SizeChangedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceTeardownParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Host -> sandbox proxy: the document to load and the policy to load it under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxResourceReadyParams {
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csp: Option<UiResourceCsp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<UiPermissions>,
}
