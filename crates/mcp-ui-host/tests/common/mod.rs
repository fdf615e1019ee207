#![allow(dead_code)]
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mcp_ui_core::{
    model::{
        CallToolRequestParams, CallToolResult, Content, ReadResourceResult, ResourceContents,
        Tool, empty_object_schema,
    },
    ui::apps::{RESOURCE_MIME_TYPE, UiResourceCsp, UiResourceMeta, UiToolMeta, Visibility},
};
use mcp_ui_host::{
    HostConfig, HostError, McpClient, SandboxConfig,
    bridge::AppBridge,
    handlers::DefaultHandlers,
    renderer::RenderPlan,
};
use serde_json::Value;
use url::Url;

pub const VIEW_URI: &str = "ui://counter/view";
pub const VIEW_HTML: &str = "<html><body><div id=\"count\">0</div></body></html>";

/// An in-memory MCP server with a counter app.
pub struct MockClient {
    pub tools: Vec<Tool>,
    pub resources: Vec<ResourceContents>,
    pub calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn counter() -> Self {
        let view_meta = UiResourceMeta::default()
            .with_border(true)
            .with_csp(UiResourceCsp {
                connect_domains: Some(vec!["https://api.counter.dev".into()]),
                ..Default::default()
            });
        Self {
            tools: vec![
                Tool::new("increment", "Increment the counter", empty_object_schema())
                    .with_meta(UiToolMeta::new(VIEW_URI).to_meta()),
                Tool::new("refresh", "Reload the counter", empty_object_schema()).with_meta(
                    UiToolMeta::new(VIEW_URI)
                        .with_visibility(vec![Visibility::App])
                        .to_meta(),
                ),
                Tool::new("reset", "Reset the counter", empty_object_schema()).with_meta(
                    UiToolMeta::new(VIEW_URI)
                        .with_visibility(vec![Visibility::Model])
                        .to_meta(),
                ),
                Tool::new("status", "Plain tool without UI", empty_object_schema()),
            ],
            resources: vec![
                ResourceContents::text(VIEW_URI, RESOURCE_MIME_TYPE, VIEW_HTML)
                    .with_meta(view_meta.to_meta()),
            ],
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl McpClient for MockClient {
    async fn call_tool(&self, params: CallToolRequestParams) -> Result<CallToolResult, HostError> {
        self.calls.lock().unwrap().push(params.name.to_string());
        Ok(CallToolResult::success(vec![Content::text(format!(
            "{} done",
            params.name
        ))]))
    }

    async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, HostError> {
        let contents: Vec<_> = self
            .resources
            .iter()
            .filter(|contents| contents.uri() == uri)
            .cloned()
            .collect();
        if contents.is_empty() {
            return Err(HostError::Client(format!("Resource not found: {uri}")));
        }
        Ok(ReadResourceResult { contents })
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, HostError> {
        Ok(self.tools.clone())
    }
}

pub fn sandbox_config() -> SandboxConfig {
    SandboxConfig::new(Url::parse("https://sandbox.host.dev/proxy.html").unwrap()).unwrap()
}

pub fn host_config() -> HostConfig {
    HostConfig::from_json_str(
        r#"{
            "hostInfo": { "name": "test-host", "version": "1.0.0" },
            "theme": "dark",
            "displayModes": ["inline", "fullscreen"],
            "sandbox": { "url": "https://sandbox.host.dev/proxy.html" }
        }"#,
    )
    .unwrap()
}

pub fn view_plan(client: &MockClient) -> RenderPlan {
    RenderPlan::from_contents(&client.resources[0], &sandbox_config()).unwrap()
}

pub fn bridge(client: Arc<MockClient>) -> AppBridge {
    let plan = view_plan(&client);
    AppBridge::new(host_config(), plan, client, Arc::new(DefaultHandlers))
}

pub fn request(id: i64, method: &str, params: Value) -> Value {
    serde_json::json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

pub fn notification(method: &str, params: Option<Value>) -> Value {
    match params {
        Some(params) => serde_json::json!({ "jsonrpc": "2.0", "method": method, "params": params }),
        None => serde_json::json!({ "jsonrpc": "2.0", "method": method }),
    }
}
