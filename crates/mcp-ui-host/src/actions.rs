//! Handling of mcp-ui UI actions posted by views that do not speak the
//! MCP Apps bridge.
use std::sync::Arc;

use mcp_ui_core::{
    model::CallToolRequestParams,
    ui::{
        UiMetadata,
        action::{ActionOutcome, HostMessage, UiAction, UiActionMessage},
    },
};
use serde_json::{Value, json};

use crate::{HostError, client::McpClient, handlers::AppHandlers, renderer::RenderPlan};

pub struct UiActionDispatcher {
    client: Arc<dyn McpClient>,
    handlers: Arc<dyn AppHandlers>,
    ui_metadata: UiMetadata,
}

impl UiActionDispatcher {
    pub fn new(
        client: Arc<dyn McpClient>,
        handlers: Arc<dyn AppHandlers>,
        ui_metadata: UiMetadata,
    ) -> Self {
        Self {
            client,
            handlers,
            ui_metadata,
        }
    }

    pub fn for_plan(
        client: Arc<dyn McpClient>,
        handlers: Arc<dyn AppHandlers>,
        plan: &RenderPlan,
    ) -> Self {
        Self::new(client, handlers, plan.ui_metadata.clone())
    }

    fn render_data(&self) -> Option<HostMessage> {
        self.ui_metadata
            .initial_render_data
            .clone()
            .map(|render_data| HostMessage::RenderData { render_data })
    }

    /// Handle one posted message; returns what to post back, in order.
    pub async fn handle(&self, message: Value) -> Result<Vec<HostMessage>, HostError> {
        let UiActionMessage { action, message_id } = UiActionMessage::from_value(message)?;
        tracing::debug!(kind = action.kind(), ?message_id, "UI action");

        let mut replies = Vec::new();
        if let Some(message_id) = &message_id {
            replies.push(HostMessage::MessageReceived {
                message_id: message_id.clone(),
            });
        }

        let outcome = match action {
            UiAction::Tool { tool_name, params } => {
                let params = CallToolRequestParams::new(tool_name, Some(params));
                let result = self.handlers.on_tool_call(self.client.as_ref(), params).await;
                Some(result.and_then(|r| Ok(serde_json::to_value(r)?)))
            }
            UiAction::Prompt { prompt } => Some(self.handlers.on_prompt(&prompt).await),
            UiAction::Link { url } => {
                Some(self.handlers.on_open_link(&url).await.map(|()| Value::Null))
            }
            UiAction::Intent { intent, params } => {
                Some(self.handlers.on_intent(&intent, &params).await)
            }
            UiAction::Notify { message } => {
                Some(self.handlers.on_notify(&message).await.map(|()| Value::Null))
            }
            UiAction::RequestData {
                request_type,
                params,
            } => Some(self.handlers.on_request_data(&request_type, &params).await),
            UiAction::IframeReady | UiAction::RequestRenderData => {
                replies.extend(self.render_data());
                None
            }
            UiAction::SizeChange { width, height } => {
                self.handlers.on_size_changed(width, height).await;
                None
            }
        };

        if let (Some(message_id), Some(outcome)) = (message_id, outcome) {
            let outcome = match outcome {
                Ok(response) => ActionOutcome::Response(response),
                Err(e) => {
                    tracing::debug!(error = %e, "UI action failed");
                    ActionOutcome::Error(json!({ "message": e.to_string() }))
                }
            };
            replies.push(HostMessage::MessageResponse {
                message_id,
                outcome,
            });
        }
        Ok(replies)
    }
}
