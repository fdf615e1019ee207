use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::{Future, future::BoxFuture};
use mcp_ui_core::{
    model::{
        CallToolRequestParams, CallToolResult, InitializeRequestParams, InitializeResult,
        Implementation, JsonObject, ListResourcesResult,
        ListToolsResult, RawResource, ReadResourceRequestParams, ReadResourceResult,
        ResourcesCapability, ServerCapabilities, Tool, ToolsCapability,
        negotiate_mcp_protocol_version,
    },
    protocol::{JsonRpcRequest, JsonRpcResponse},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tower_service::Service;

use crate::{BoxError, RouterError};

/// Builder for [`ServerCapabilities`].
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    tools: Option<ToolsCapability>,
    resources: Option<ResourcesCapability>,
    experimental: Option<JsonObject>,
}

impl CapabilitiesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools(mut self, list_changed: bool) -> Self {
        self.tools = Some(ToolsCapability {
            list_changed: Some(list_changed),
        });
        self
    }

    pub fn with_resources(mut self, subscribe: bool, list_changed: bool) -> Self {
        self.resources = Some(ResourcesCapability {
            subscribe: Some(subscribe),
            list_changed: Some(list_changed),
        });
        self
    }

    /// Advertise a protocol extension under `experimental`.
    pub fn with_extension(mut self, id: impl Into<String>, settings: Value) -> Self {
        self.experimental
            .get_or_insert_with(JsonObject::new)
            .insert(id.into(), settings);
        self
    }

    pub fn build(self) -> ServerCapabilities {
        ServerCapabilities {
            tools: self.tools,
            resources: self.resources,
            experimental: self.experimental,
        }
    }
}

/// What an MCP server serves.
pub trait Router: Send + Sync + 'static {
    fn name(&self) -> String;
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
    fn instructions(&self) -> Option<String>;
    fn capabilities(&self) -> ServerCapabilities;
    fn list_tools(&self) -> Vec<Tool>;
    fn call_tool(
        &self,
        tool_name: &str,
        arguments: Option<JsonObject>,
    ) -> BoxFuture<'static, Result<CallToolResult, RouterError>>;
    fn list_resources(&self) -> Vec<RawResource>;
    fn read_resource(&self, uri: &str) -> BoxFuture<'static, Result<ReadResourceResult, RouterError>>;
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, RouterError> {
    let params = params.ok_or_else(|| RouterError::InvalidParams("Missing params".into()))?;
    serde_json::from_value(params).map_err(|e| RouterError::InvalidParams(e.to_string()))
}

fn to_result_value<T: Serialize>(value: T) -> Result<Value, RouterError> {
    serde_json::to_value(value).map_err(|e| RouterError::Internal(e.to_string()))
}

async fn dispatch<R: Router + ?Sized>(
    router: &R,
    method: &str,
    params: Option<Value>,
) -> Result<Value, RouterError> {
    match method {
        "initialize" => {
            let requested = params
                .map(serde_json::from_value::<InitializeRequestParams>)
                .transpose()
                .map_err(|e| RouterError::InvalidParams(e.to_string()))?
                .and_then(|p| p.protocol_version);
            let version = negotiate_mcp_protocol_version(requested.as_deref());
            tracing::debug!(?requested, negotiated = version, "client protocol version");
            to_result_value(InitializeResult {
                protocol_version: version.to_string(),
                capabilities: router.capabilities(),
                server_info: Implementation::new(router.name(), router.version()),
                instructions: router.instructions(),
            })
        }
        "ping" => Ok(Value::Object(JsonObject::new())),
        "tools/list" => to_result_value(ListToolsResult {
            tools: router.list_tools(),
            next_cursor: None,
        }),
        "tools/call" => {
            let CallToolRequestParams { name, arguments } = parse_params(params)?;
            let result = router.call_tool(&name, arguments).await?;
            to_result_value(result)
        }
        "resources/list" => to_result_value(ListResourcesResult {
            resources: router.list_resources(),
            next_cursor: None,
        }),
        "resources/read" => {
            let ReadResourceRequestParams { uri } = parse_params(params)?;
            let result = router.read_resource(&uri).await?;
            to_result_value(result)
        }
        other => Err(RouterError::MethodNotFound(other.to_string())),
    }
}

/// Adapts a [`Router`] into a JSON-RPC request/response service.
#[derive(Clone)]
pub struct RouterService<T>(pub T);

impl<T> Service<JsonRpcRequest> for RouterService<T>
where
    T: Router + Clone,
{
    type Response = JsonRpcResponse;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: JsonRpcRequest) -> Self::Future {
        let this = self.0.clone();

        Box::pin(async move {
            let JsonRpcRequest {
                id, method, params, ..
            } = req;
            let response = match dispatch(&this, &method, params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => {
                    tracing::debug!(method = %method, error = %e, "request failed");
                    JsonRpcResponse::error(id, e.into())
                }
            };
            Ok(response)
        })
    }
}
