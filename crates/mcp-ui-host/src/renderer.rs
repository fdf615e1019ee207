//! Turning a tool into something a host can put on screen.
use std::sync::Arc;

use mcp_ui_core::{
    UiError,
    model::{CallToolResult, ResourceContents, Tool},
    ui::{
        RemoteDomFramework, UiMetadata, UiMimeType,
        apps::{UiResourceMeta, tool_ui_resource_uri},
        decode_contents, is_ui_uri,
    },
};
use serde_json::Value;
use url::Url;

use crate::{
    HostError,
    bridge::AppBridge,
    client::McpClient,
    config::{HostConfig, SandboxConfig},
    handlers::{AppHandlers, DefaultHandlers},
    sandbox::SandboxPolicy,
};

/// How a UI resource has to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Plain HTML, loaded as the iframe document
    Html,
    /// A URL loaded as the iframe source
    ExternalUrl,
    /// A script rendered through a remote DOM receiver
    RemoteDom(RemoteDomFramework),
    /// An MCP Apps view that talks to the host over the bridge
    McpApp,
}

impl From<UiMimeType> for RenderMode {
    fn from(mime: UiMimeType) -> Self {
        match mime {
            UiMimeType::Html => RenderMode::Html,
            UiMimeType::UriList => RenderMode::ExternalUrl,
            UiMimeType::RemoteDom(framework) => RenderMode::RemoteDom(framework),
            UiMimeType::McpApp => RenderMode::McpApp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub uri: String,
    pub mode: RenderMode,
    /// The HTML document, the URL, or the remote DOM script, per `mode`
    pub content: String,
    pub resource_meta: Option<UiResourceMeta>,
    pub ui_metadata: UiMetadata,
    pub sandbox: SandboxPolicy,
}

// A text/uri-list may hold comments and several URLs; only the first is used.
fn first_uri(list: &str) -> Option<&str> {
    list.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

impl RenderPlan {
    pub fn from_contents(
        contents: &ResourceContents,
        sandbox: &SandboxConfig,
    ) -> Result<Self, HostError> {
        let mime_type = contents
            .mime_type()
            .ok_or_else(|| UiError::UnknownMimeType(String::new()))?;
        let mode = RenderMode::from(UiMimeType::parse(mime_type)?);
        let text = decode_contents(contents)?;

        let content = match mode {
            RenderMode::ExternalUrl => {
                let uri = first_uri(&text).ok_or_else(|| {
                    UiError::InvalidContent("uri-list holds no URL".into())
                })?;
                let url = Url::parse(uri)
                    .map_err(|e| UiError::InvalidContent(format!("invalid URL {uri}: {e}")))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(UiError::InvalidContent(format!("refusing to load {url}")).into());
                }
                url.to_string()
            }
            _ => text,
        };

        let resource_meta = UiResourceMeta::from_contents(contents);
        let ui_metadata = contents
            .meta()
            .map(UiMetadata::from_meta)
            .unwrap_or_default();
        let sandbox = SandboxPolicy::new(sandbox, resource_meta.as_ref());

        Ok(Self {
            uri: contents.uri().to_string(),
            mode,
            content,
            resource_meta,
            ui_metadata,
            sandbox,
        })
    }
}

/// Resolves the UI of a tool call into a [`RenderPlan`].
pub struct AppRenderer {
    client: Arc<dyn McpClient>,
    tool_name: String,
    sandbox: SandboxConfig,
    tool: Option<Tool>,
    tool_input: Option<Value>,
    tool_result: Option<CallToolResult>,
    handlers: Arc<dyn AppHandlers>,
}

impl AppRenderer {
    pub fn new(
        client: Arc<dyn McpClient>,
        tool_name: impl Into<String>,
        sandbox: SandboxConfig,
    ) -> Self {
        Self {
            client,
            tool_name: tool_name.into(),
            sandbox,
            tool: None,
            tool_input: None,
            tool_result: None,
            handlers: Arc::new(DefaultHandlers),
        }
    }

    /// Use this definition instead of looking the tool up.
    pub fn tool(mut self, tool: Tool) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn tool_input(mut self, arguments: Value) -> Self {
        self.tool_input = Some(arguments);
        self
    }

    pub fn tool_result(mut self, result: CallToolResult) -> Self {
        self.tool_result = Some(result);
        self
    }

    pub fn handlers(mut self, handlers: Arc<dyn AppHandlers>) -> Self {
        self.handlers = handlers;
        self
    }

    async fn find_tool(&self) -> Result<Tool, HostError> {
        if let Some(tool) = &self.tool {
            return Ok(tool.clone());
        }
        self.client
            .list_tools()
            .await?
            .into_iter()
            .find(|tool| tool.name == self.tool_name)
            .ok_or_else(|| HostError::ToolNotFound(self.tool_name.clone()))
    }

    /// Fetch the tool's UI resource and work out how to show it.
    pub async fn resolve(&self) -> Result<RenderPlan, HostError> {
        let tool = self.find_tool().await?;
        let uri = tool_ui_resource_uri(&tool)
            .ok_or_else(|| HostError::NoUiResource(self.tool_name.clone()))?;

        let result = self.client.read_resource(&uri).await?;
        let contents = result
            .contents
            .iter()
            .find(|contents| contents.uri() == uri)
            .or_else(|| result.contents.first())
            .ok_or_else(|| {
                HostError::InvalidResource(format!("resources/read returned nothing for {uri}"))
            })?;

        let plan = RenderPlan::from_contents(contents, &self.sandbox)?;
        tracing::debug!(tool = %self.tool_name, uri = %plan.uri, mode = ?plan.mode, "resolved UI");
        Ok(plan)
    }

    /// Plans for `ui://` resources embedded in a tool result.
    pub fn resolve_embedded(&self, result: &CallToolResult) -> Result<Vec<RenderPlan>, HostError> {
        result
            .content
            .iter()
            .filter_map(|content| content.as_resource())
            .filter(|embedded| is_ui_uri(embedded.resource.uri()))
            .map(|embedded| RenderPlan::from_contents(&embedded.resource, &self.sandbox))
            .collect()
    }

    /// Start a bridge for `plan`, with the renderer's tool input and result queued.
    pub fn into_bridge(self, plan: RenderPlan, config: HostConfig) -> Result<AppBridge, HostError> {
        if !matches!(plan.mode, RenderMode::McpApp | RenderMode::Html) {
            return Err(HostError::Unsupported(format!(
                "bridge for {:?} resources",
                plan.mode
            )));
        }
        let mut bridge = AppBridge::new(config, plan, self.client, self.handlers);
        if let Some(arguments) = self.tool_input {
            bridge.send_tool_input(arguments);
        }
        if let Some(result) = self.tool_result {
            bridge.send_tool_result(result);
        }
        Ok(bridge)
    }
}
