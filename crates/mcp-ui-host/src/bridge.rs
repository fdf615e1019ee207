//! Host end of the MCP Apps postMessage bridge.
//!
//! [`AppBridge`] is transport agnostic: the host feeds it every message the
//! view (or its sandbox proxy) posts and delivers whatever comes back, in
//! order, to the iframe.
use std::{collections::VecDeque, sync::Arc};

use mcp_ui_core::{
    model::{CallToolRequestParams, CallToolResult, ReadResourceRequestParams, Tool},
    protocol::{
        ErrorData, INVALID_PARAMS, INVALID_REQUEST, JsonRpcMessage, JsonRpcNotification,
        JsonRpcRequest, JsonRpcResponse, RequestId,
    },
    ui::{
        apps::{DisplayMode, Visibility, tool_visibility},
        bridge::{
            AppInfo, HostContext, MessageParams, OpenLinkParams, RequestDisplayModeParams,
            RequestDisplayModeResult, ResourceTeardownParams, SUPPORTED_PROTOCOL_VERSIONS,
            SandboxResourceReadyParams, SizeChangedParams, ToolCancelledParams, ToolInputParams,
            ToolResultParams, UiInitializeParams, UiInitializeResult, UpdateModelContextParams,
            methods, negotiate_protocol_version,
        },
    },
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    BridgeError, HostError, client::McpClient, config::HostConfig, handlers::AppHandlers,
    renderer::RenderPlan, sandbox::sanitize_csp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Waiting for the sandbox proxy to report ready
    AwaitingProxy,
    ProxyReady,
    /// The view document has been handed to the proxy
    Loaded,
    /// `ui/initialize` answered, waiting for `initialized`
    Initializing,
    Initialized,
    /// `ui/resource-teardown` sent, waiting for the view to answer
    TearingDown,
    Closed,
}

type RequestResult = Result<Value, ErrorData>;

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, ErrorData> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| ErrorData::invalid_params(e.to_string(), None))
}

fn to_result<T: Serialize>(value: T) -> RequestResult {
    serde_json::to_value(value).map_err(|e| ErrorData::internal_error(e.to_string(), None))
}

fn empty_result() -> RequestResult {
    Ok(json!({}))
}

fn host_error(err: HostError) -> ErrorData {
    ErrorData::from(&err)
}

fn notification<T: Serialize>(method: &str, params: T) -> JsonRpcNotification {
    JsonRpcNotification::new(method, serde_json::to_value(params).ok())
}

/// One view's bridge to the host.
pub struct AppBridge {
    state: BridgeState,
    config: HostConfig,
    plan: RenderPlan,
    client: Arc<dyn McpClient>,
    handlers: Arc<dyn AppHandlers>,
    host_context: HostContext,
    display_mode: DisplayMode,
    app_info: Option<AppInfo>,
    protocol_version: Option<String>,
    // outbound notifications held until the view is initialized
    pending: VecDeque<JsonRpcNotification>,
    tools: Option<Vec<Tool>>,
    next_request_id: i64,
    teardown_id: Option<RequestId>,
}

impl AppBridge {
    pub fn new(
        config: HostConfig,
        plan: RenderPlan,
        client: Arc<dyn McpClient>,
        handlers: Arc<dyn AppHandlers>,
    ) -> Self {
        let host_context = config.host_context();
        let display_mode = config.initial_display_mode();
        Self {
            state: BridgeState::AwaitingProxy,
            config,
            plan,
            client,
            handlers,
            host_context,
            display_mode,
            app_info: None,
            protocol_version: None,
            pending: VecDeque::new(),
            tools: None,
            next_request_id: 1,
            teardown_id: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// The view's `clientInfo`, once it has initialized.
    pub fn app_info(&self) -> Option<&AppInfo> {
        self.app_info.as_ref()
    }

    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    pub fn host_context(&self) -> &HostContext {
        &self.host_context
    }

    fn set_state(&mut self, state: BridgeState) {
        tracing::debug!(uri = %self.plan.uri, from = ?self.state, to = ?state, "bridge state");
        self.state = state;
    }

    /// Handle one message from the view or its sandbox proxy.
    ///
    /// Returns the messages to post back, in order.
    pub async fn handle_message(&mut self, message: Value) -> Result<Vec<Value>, BridgeError> {
        if self.state == BridgeState::Closed {
            return Err(BridgeError::Closed);
        }
        let message: JsonRpcMessage = serde_json::from_value(message)
            .map_err(|e| BridgeError::InvalidMessage(e.to_string()))?;

        match message {
            JsonRpcMessage::Request(request) => {
                let id = request.id.clone();
                let response = match self.handle_request(request).await {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(error) => JsonRpcResponse::error(id, error),
                };
                Ok(vec![JsonRpcMessage::Response(response).to_value()])
            }
            JsonRpcMessage::Notification(notification) => {
                Ok(self.handle_notification(notification).await)
            }
            JsonRpcMessage::Response(response) => {
                if self.state == BridgeState::TearingDown
                    && self.teardown_id.as_ref() == Some(&response.id)
                {
                    self.teardown_id = None;
                    self.set_state(BridgeState::Closed);
                } else {
                    tracing::debug!(id = %response.id, "ignoring unexpected response");
                }
                Ok(Vec::new())
            }
            JsonRpcMessage::Error(error) => {
                tracing::warn!(error = %error.error, "view reported an error");
                Ok(Vec::new())
            }
            JsonRpcMessage::Nil => Ok(Vec::new()),
        }
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> RequestResult {
        let JsonRpcRequest { method, params, .. } = request;
        tracing::debug!(method = %method, "view request");

        match method.as_str() {
            methods::INITIALIZE => self.initialize(parse_params(params)?),
            methods::PING => empty_result(),
            methods::OPEN_LINK => {
                let OpenLinkParams { url } = parse_params(params)?;
                self.handlers.on_open_link(&url).await.map_err(host_error)?;
                empty_result()
            }
            methods::MESSAGE => {
                let params: MessageParams = parse_params(params)?;
                self.handlers.on_message(params).await.map_err(host_error)?;
                empty_result()
            }
            methods::REQUEST_DISPLAY_MODE => {
                let RequestDisplayModeParams { mode } = parse_params(params)?;
                let granted = if self.config.display_modes.contains(&mode) {
                    self.handlers
                        .on_request_display_mode(mode)
                        .await
                        .filter(|granted| self.config.display_modes.contains(granted))
                        .unwrap_or(self.display_mode)
                } else {
                    self.display_mode
                };
                self.display_mode = granted;
                self.host_context.display_mode = Some(granted);
                to_result(RequestDisplayModeResult { mode: granted })
            }
            methods::UPDATE_MODEL_CONTEXT => {
                let params: UpdateModelContextParams = parse_params(params)?;
                self.handlers
                    .on_update_model_context(params)
                    .await
                    .map_err(host_error)?;
                empty_result()
            }
            methods::TOOLS_CALL => {
                let params: CallToolRequestParams = parse_params(params)?;
                self.ensure_app_visible(&params.name).await?;
                let result = self
                    .handlers
                    .on_tool_call(self.client.as_ref(), params)
                    .await
                    .map_err(host_error)?;
                to_result(result)
            }
            methods::RESOURCES_READ => {
                let ReadResourceRequestParams { uri } = parse_params(params)?;
                let result = self.client.read_resource(&uri).await.map_err(host_error)?;
                to_result(result)
            }
            other => Err(ErrorData::method_not_found(other)),
        }
    }

    fn initialize(&mut self, params: UiInitializeParams) -> RequestResult {
        if matches!(
            self.state,
            BridgeState::Initializing | BridgeState::Initialized | BridgeState::TearingDown
        ) {
            return Err(ErrorData::new(
                INVALID_REQUEST,
                "view is already initialized",
                None,
            ));
        }

        let mut version = negotiate_protocol_version(&params.protocol_version);
        // never speak a newer version than the host is configured for
        let host_version = self.config.protocol_version.as_str();
        if SUPPORTED_PROTOCOL_VERSIONS.contains(&host_version) && host_version < version {
            version = negotiate_protocol_version(host_version);
        }

        if let Some(modes) = params
            .app_capabilities
            .and_then(|caps| caps.available_display_modes)
        {
            tracing::debug!(?modes, "view display modes");
        }
        self.app_info = params.client_info;
        self.protocol_version = Some(version.to_string());

        let result = UiInitializeResult {
            protocol_version: version.to_string(),
            host_capabilities: self.config.host_capabilities(),
            host_info: self.config.host_info.clone(),
            host_context: Some(self.host_context.clone()),
        };
        self.set_state(BridgeState::Initializing);
        to_result(result)
    }

    async fn ensure_app_visible(&mut self, name: &str) -> Result<(), ErrorData> {
        if self.tools.is_none() {
            let tools = self.client.list_tools().await.map_err(host_error)?;
            self.tools = Some(tools);
        }
        let tool = self
            .tools
            .iter()
            .flatten()
            .find(|tool| tool.name == name)
            .ok_or_else(|| ErrorData::invalid_params(format!("Tool not found: {name}"), None))?;
        if !tool_visibility(tool).contains(&Visibility::App) {
            tracing::warn!(tool = %name, "view called a tool not visible to apps");
            return Err(ErrorData::new(
                INVALID_PARAMS,
                format!("Tool {name} is not callable from apps"),
                None,
            ));
        }
        Ok(())
    }

    async fn handle_notification(&mut self, message: JsonRpcNotification) -> Vec<Value> {
        let JsonRpcNotification { method, params, .. } = message;

        match method.as_str() {
            methods::SANDBOX_PROXY_READY => {
                if self.state != BridgeState::AwaitingProxy {
                    tracing::warn!(state = ?self.state, "sandbox proxy reported ready twice");
                    return Vec::new();
                }
                self.set_state(BridgeState::ProxyReady);
                let ready = notification_value(notification(
                    methods::SANDBOX_RESOURCE_READY,
                    SandboxResourceReadyParams {
                        html: self.plan.content.clone(),
                        sandbox: Some(self.plan.sandbox.sandbox_attribute.clone()),
                        csp: self
                            .plan
                            .resource_meta
                            .as_ref()
                            .and_then(|m| m.csp.as_ref())
                            .map(sanitize_csp),
                        permissions: self
                            .plan
                            .resource_meta
                            .as_ref()
                            .and_then(|m| m.permissions.clone()),
                    },
                ));
                self.set_state(BridgeState::Loaded);
                vec![ready]
            }
            methods::INITIALIZED => {
                if self.state != BridgeState::Initializing {
                    tracing::warn!(state = ?self.state, "unexpected initialized notification");
                    return Vec::new();
                }
                self.set_state(BridgeState::Initialized);
                self.flush_pending()
            }
            methods::SIZE_CHANGED => {
                match parse_params::<SizeChangedParams>(params) {
                    Ok(SizeChangedParams { width, height }) => {
                        self.handlers.on_size_changed(width, height).await;
                    }
                    Err(e) => tracing::warn!(error = %e, "malformed size-changed"),
                }
                Vec::new()
            }
            other => {
                tracing::debug!(method = %other, "ignoring view notification");
                Vec::new()
            }
        }
    }

    // Tool input always reaches the view before anything else queued.
    fn flush_pending(&mut self) -> Vec<Value> {
        let (inputs, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|n| {
            n.method == methods::TOOL_INPUT_PARTIAL || n.method == methods::TOOL_INPUT
        });
        inputs
            .into_iter()
            .chain(rest)
            .map(notification_value)
            .collect()
    }

    fn send(&mut self, notification: JsonRpcNotification) -> Vec<Value> {
        match self.state {
            BridgeState::Initialized => vec![notification_value(notification)],
            BridgeState::TearingDown | BridgeState::Closed => {
                tracing::debug!(method = %notification.method, "dropping message for closing view");
                Vec::new()
            }
            _ => {
                self.pending.push_back(notification);
                Vec::new()
            }
        }
    }

    pub fn send_tool_input(&mut self, arguments: Value) -> Vec<Value> {
        self.send(notification(methods::TOOL_INPUT, ToolInputParams { arguments }))
    }

    pub fn send_tool_input_partial(&mut self, arguments: Value) -> Vec<Value> {
        self.send(notification(
            methods::TOOL_INPUT_PARTIAL,
            ToolInputParams { arguments },
        ))
    }

    pub fn send_tool_result(&mut self, result: CallToolResult) -> Vec<Value> {
        let params = ToolResultParams {
            content: Some(
                result
                    .content
                    .iter()
                    .filter_map(|c| serde_json::to_value(c).ok())
                    .collect(),
            ),
            structured_content: result.structured_content,
            is_error: result.is_error,
            meta: result.meta.and_then(|m| serde_json::to_value(m).ok()),
        };
        self.send(notification(methods::TOOL_RESULT, params))
    }

    pub fn send_tool_cancelled(&mut self, reason: Option<String>) -> Vec<Value> {
        self.send(notification(
            methods::TOOL_CANCELLED,
            ToolCancelledParams { reason },
        ))
    }

    /// Replace the host context; an initialized view is told about it.
    pub fn set_host_context(&mut self, context: HostContext) -> Vec<Value> {
        if let Some(mode) = context.display_mode {
            self.display_mode = mode;
        }
        self.host_context = context;
        match self.state {
            BridgeState::Initialized => vec![notification_value(notification(
                methods::HOST_CONTEXT_CHANGED,
                &self.host_context,
            ))],
            // The view already holds the context from its initialize result;
            // anything newer is delivered once it reports initialized.
            BridgeState::Initializing => {
                self.pending.retain(|n| n.method != methods::HOST_CONTEXT_CHANGED);
                self.pending.push_back(notification(
                    methods::HOST_CONTEXT_CHANGED,
                    &self.host_context,
                ));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Ask the view to shut down.
    ///
    /// A view that never initialized is closed right away.
    pub fn teardown(&mut self, reason: Option<String>) -> Result<Vec<Value>, BridgeError> {
        match self.state {
            BridgeState::Closed => return Err(BridgeError::Closed),
            BridgeState::TearingDown => return Ok(Vec::new()),
            BridgeState::Initialized | BridgeState::Initializing => {}
            _ => {
                self.pending.clear();
                self.set_state(BridgeState::Closed);
                return Ok(Vec::new());
            }
        }

        let id = RequestId::Number(self.next_request_id);
        self.next_request_id += 1;
        let request = JsonRpcRequest::new(
            id.clone(),
            methods::RESOURCE_TEARDOWN,
            serde_json::to_value(ResourceTeardownParams { reason }).ok(),
        );
        self.teardown_id = Some(id);
        self.pending.clear();
        self.set_state(BridgeState::TearingDown);
        Ok(vec![JsonRpcMessage::Request(request).to_value()])
    }
}

fn notification_value(notification: JsonRpcNotification) -> Value {
    JsonRpcMessage::Notification(notification).to_value()
}
