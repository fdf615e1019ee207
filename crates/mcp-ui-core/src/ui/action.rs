//! Messages exchanged over postMessage between an mcp-ui view and its host.
//!
//! Every message has the flat shape `{ type, messageId?, payload? }`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{UiError, model::JsonObject};

pub mod message_types {
    pub const TOOL: &str = "tool";
    pub const PROMPT: &str = "prompt";
    pub const LINK: &str = "link";
    pub const INTENT: &str = "intent";
    pub const NOTIFY: &str = "notify";

    pub const IFRAME_READY: &str = "ui-lifecycle-iframe-ready";
    pub const SIZE_CHANGE: &str = "ui-size-change";
    pub const REQUEST_DATA: &str = "ui-request-data";
    pub const REQUEST_RENDER_DATA: &str = "ui-request-render-data";

    pub const MESSAGE_RECEIVED: &str = "ui-message-received";
    pub const MESSAGE_RESPONSE: &str = "ui-message-response";
    pub const IFRAME_RENDER_DATA: &str = "ui-lifecycle-iframe-render-data";
}

use message_types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUiMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolPayload {
    tool_name: String,
    #[serde(default)]
    params: JsonObject,
}

#[derive(Deserialize)]
struct PromptPayload {
    prompt: String,
}

#[derive(Deserialize)]
struct LinkPayload {
    url: String,
}

#[derive(Deserialize)]
struct IntentPayload {
    intent: String,
    #[serde(default)]
    params: JsonObject,
}

#[derive(Deserialize)]
struct NotifyPayload {
    message: String,
}

#[derive(Deserialize)]
struct SizePayload {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestDataPayload {
    request_type: String,
    #[serde(default)]
    params: Value,
}

/// What a view asks of its host.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Tool { tool_name: String, params: JsonObject },
    Prompt { prompt: String },
    Link { url: String },
    Intent { intent: String, params: JsonObject },
    Notify { message: String },
    IframeReady,
    SizeChange { width: Option<f64>, height: Option<f64> },
    RequestData { request_type: String, params: Value },
    RequestRenderData,
}

impl UiAction {
    pub fn kind(&self) -> &'static str {
        match self {
            UiAction::Tool { .. } => TOOL,
            UiAction::Prompt { .. } => PROMPT,
            UiAction::Link { .. } => LINK,
            UiAction::Intent { .. } => INTENT,
            UiAction::Notify { .. } => NOTIFY,
            UiAction::IframeReady => IFRAME_READY,
            UiAction::SizeChange { .. } => SIZE_CHANGE,
            UiAction::RequestData { .. } => REQUEST_DATA,
            UiAction::RequestRenderData => REQUEST_RENDER_DATA,
        }
    }

    /// User-level actions, as opposed to lifecycle plumbing.
    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            UiAction::Tool { .. }
                | UiAction::Prompt { .. }
                | UiAction::Link { .. }
                | UiAction::Intent { .. }
                | UiAction::Notify { .. }
        )
    }

    fn payload(&self) -> Value {
        match self {
            UiAction::Tool { tool_name, params } => {
                serde_json::json!({ "toolName": tool_name, "params": params })
            }
            UiAction::Prompt { prompt } => serde_json::json!({ "prompt": prompt }),
            UiAction::Link { url } => serde_json::json!({ "url": url }),
            UiAction::Intent { intent, params } => {
                serde_json::json!({ "intent": intent, "params": params })
            }
            UiAction::Notify { message } => serde_json::json!({ "message": message }),
            UiAction::SizeChange { width, height } => {
                let mut payload = JsonObject::new();
                if let Some(width) = width {
                    payload.insert("width".into(), serde_json::json!(width));
                }
                if let Some(height) = height {
                    payload.insert("height".into(), serde_json::json!(height));
                }
                Value::Object(payload)
            }
            UiAction::RequestData {
                request_type,
                params,
            } => serde_json::json!({ "requestType": request_type, "params": params }),
            UiAction::IframeReady | UiAction::RequestRenderData => Value::Null,
        }
    }
}

/// A message posted by a view, with the id it expects replies under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUiMessage", into = "RawUiMessage")]
pub struct UiActionMessage {
    pub action: UiAction,
    pub message_id: Option<String>,
}

impl UiActionMessage {
    pub fn new(action: UiAction) -> Self {
        Self {
            action,
            message_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn from_value(value: Value) -> Result<Self, UiError> {
        Ok(serde_json::from_value(value)?)
    }
}

fn payload<T: serde::de::DeserializeOwned>(kind: &str, payload: Value) -> Result<T, UiError> {
    serde_json::from_value(payload)
        .map_err(|e| UiError::InvalidContent(format!("invalid '{kind}' payload: {e}")))
}

impl TryFrom<RawUiMessage> for UiActionMessage {
    type Error = UiError;

    fn try_from(raw: RawUiMessage) -> Result<Self, Self::Error> {
        let RawUiMessage {
            kind,
            message_id,
            payload: body,
        } = raw;
        let action = match kind.as_str() {
            TOOL => {
                let p: ToolPayload = payload(&kind, body)?;
                UiAction::Tool {
                    tool_name: p.tool_name,
                    params: p.params,
                }
            }
            PROMPT => UiAction::Prompt {
                prompt: payload::<PromptPayload>(&kind, body)?.prompt,
            },
            LINK => UiAction::Link {
                url: payload::<LinkPayload>(&kind, body)?.url,
            },
            INTENT => {
                let p: IntentPayload = payload(&kind, body)?;
                UiAction::Intent {
                    intent: p.intent,
                    params: p.params,
                }
            }
            NOTIFY => UiAction::Notify {
                message: payload::<NotifyPayload>(&kind, body)?.message,
            },
            IFRAME_READY => UiAction::IframeReady,
            SIZE_CHANGE => {
                let p: SizePayload = payload(&kind, body)?;
                UiAction::SizeChange {
                    width: p.width,
                    height: p.height,
                }
            }
            REQUEST_DATA => {
                let p: RequestDataPayload = payload(&kind, body)?;
                UiAction::RequestData {
                    request_type: p.request_type,
                    params: p.params,
                }
            }
            REQUEST_RENDER_DATA => UiAction::RequestRenderData,
            other => {
                return Err(UiError::InvalidContent(format!(
                    "unknown UI message type '{other}'"
                )));
            }
        };
        Ok(UiActionMessage { action, message_id })
    }
}

impl From<UiActionMessage> for RawUiMessage {
    fn from(message: UiActionMessage) -> Self {
        RawUiMessage {
            kind: message.action.kind().to_string(),
            payload: message.action.payload(),
            message_id: message.message_id,
        }
    }
}

/// The outcome reported back for an action carrying a `messageId`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Response(Value),
    Error(Value),
}

/// A message posted by the host into a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUiMessage", into = "RawUiMessage")]
pub enum HostMessage {
    MessageReceived {
        message_id: String,
    },
    MessageResponse {
        message_id: String,
        outcome: ActionOutcome,
    },
    RenderData {
        render_data: Value,
    },
}

impl HostMessage {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<HostMessage> for RawUiMessage {
    fn from(message: HostMessage) -> Self {
        match message {
            HostMessage::MessageReceived { message_id } => RawUiMessage {
                kind: MESSAGE_RECEIVED.into(),
                message_id: Some(message_id),
                payload: Value::Null,
            },
            HostMessage::MessageResponse {
                message_id,
                outcome,
            } => {
                let payload = match outcome {
                    ActionOutcome::Response(response) => serde_json::json!({ "response": response }),
                    ActionOutcome::Error(error) => serde_json::json!({ "error": error }),
                };
                RawUiMessage {
                    kind: MESSAGE_RESPONSE.into(),
                    message_id: Some(message_id),
                    payload,
                }
            }
            HostMessage::RenderData { render_data } => RawUiMessage {
                kind: IFRAME_RENDER_DATA.into(),
                message_id: None,
                payload: serde_json::json!({ "renderData": render_data }),
            },
        }
    }
}

impl TryFrom<RawUiMessage> for HostMessage {
    type Error = UiError;

    fn try_from(raw: RawUiMessage) -> Result<Self, Self::Error> {
        let missing_id = || UiError::InvalidContent(format!("'{}' requires a messageId", raw.kind));
        match raw.kind.as_str() {
            MESSAGE_RECEIVED => Ok(HostMessage::MessageReceived {
                message_id: raw.message_id.clone().ok_or_else(missing_id)?,
            }),
            MESSAGE_RESPONSE => {
                let message_id = raw.message_id.clone().ok_or_else(missing_id)?;
                let outcome = match raw.payload.get("error") {
                    Some(error) => ActionOutcome::Error(error.clone()),
                    None => ActionOutcome::Response(
                        raw.payload.get("response").cloned().unwrap_or(Value::Null),
                    ),
                };
                Ok(HostMessage::MessageResponse {
                    message_id,
                    outcome,
                })
            }
            IFRAME_RENDER_DATA => Ok(HostMessage::RenderData {
                render_data: raw.payload.get("renderData").cloned().unwrap_or(Value::Null),
            }),
            other => Err(UiError::InvalidContent(format!(
                "unknown host message type '{other}'"
            ))),
        }
    }
}

pub fn ui_action_tool_call(tool_name: impl Into<String>, params: JsonObject) -> UiActionMessage {
    UiActionMessage::new(UiAction::Tool {
        tool_name: tool_name.into(),
        params,
    })
}

pub fn ui_action_prompt(prompt: impl Into<String>) -> UiActionMessage {
    UiActionMessage::new(UiAction::Prompt {
        prompt: prompt.into(),
    })
}

pub fn ui_action_link(url: impl Into<String>) -> UiActionMessage {
    UiActionMessage::new(UiAction::Link { url: url.into() })
}

pub fn ui_action_intent(intent: impl Into<String>, params: JsonObject) -> UiActionMessage {
    UiActionMessage::new(UiAction::Intent {
        intent: intent.into(),
        params,
    })
}

pub fn ui_action_notify(message: impl Into<String>) -> UiActionMessage {
    UiActionMessage::new(UiAction::Notify {
        message: message.into(),
    })
}
