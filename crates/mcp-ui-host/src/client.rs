use async_trait::async_trait;
use mcp_ui_core::model::{CallToolRequestParams, CallToolResult, ReadResourceResult, Tool};

use crate::HostError;

/// The host's connection to the MCP server that owns the UI.
///
/// Implemented by whatever MCP client the host already runs; the host SDK
/// only needs these three calls.
#[async_trait]
pub trait McpClient: Send + Sync {
    async fn call_tool(&self, params: CallToolRequestParams) -> Result<CallToolResult, HostError>;

    async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, HostError>;

    async fn list_tools(&self) -> Result<Vec<Tool>, HostError>;
}
