use async_trait::async_trait;
use mcp_ui_core::{
    model::{CallToolRequestParams, CallToolResult, JsonObject},
    ui::{
        apps::DisplayMode,
        bridge::{MessageParams, UpdateModelContextParams},
    },
};
use serde_json::Value;

use crate::{HostError, client::McpClient};

/// Host callbacks for what a view asks of it.
///
/// Every method has a default: requests are refused with
/// [`HostError::Unsupported`], notifications are dropped.
#[async_trait]
pub trait AppHandlers: Send + Sync {
    async fn on_open_link(&self, url: &str) -> Result<(), HostError> {
        let _ = url;
        Err(HostError::Unsupported("open link".into()))
    }

    async fn on_message(&self, params: MessageParams) -> Result<(), HostError> {
        let _ = params;
        Err(HostError::Unsupported("message".into()))
    }

    async fn on_prompt(&self, prompt: &str) -> Result<Value, HostError> {
        let _ = prompt;
        Err(HostError::Unsupported("prompt".into()))
    }

    async fn on_intent(&self, intent: &str, params: &JsonObject) -> Result<Value, HostError> {
        let _ = params;
        Err(HostError::Unsupported(format!("intent {intent}")))
    }

    async fn on_notify(&self, message: &str) -> Result<(), HostError> {
        tracing::debug!(notification = message, "view notification");
        Ok(())
    }

    /// Forwards to the MCP server by default.
    async fn on_tool_call(
        &self,
        client: &dyn McpClient,
        params: CallToolRequestParams,
    ) -> Result<CallToolResult, HostError> {
        client.call_tool(params).await
    }

    async fn on_size_changed(&self, width: Option<f64>, height: Option<f64>) {
        tracing::trace!(?width, ?height, "view resized");
    }

    /// `None` keeps the current mode.
    async fn on_request_display_mode(&self, mode: DisplayMode) -> Option<DisplayMode> {
        let _ = mode;
        None
    }

    async fn on_update_model_context(
        &self,
        params: UpdateModelContextParams,
    ) -> Result<(), HostError> {
        let _ = params;
        Err(HostError::Unsupported("model context updates".into()))
    }

    async fn on_request_data(&self, request_type: &str, params: &Value) -> Result<Value, HostError> {
        let _ = params;
        Err(HostError::Unsupported(format!("data request {request_type}")))
    }
}

/// Handlers that accept nothing beyond the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandlers;

impl AppHandlers for DefaultHandlers {}
