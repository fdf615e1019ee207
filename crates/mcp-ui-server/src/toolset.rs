use std::{collections::HashMap, future::Future, sync::Arc};

use futures::future::BoxFuture;
use mcp_ui_core::model::{CallToolResult, Content, JsonObject, Tool};

use crate::{RouterError, ToolError};

pub type ToolHandlerFn = Arc<
    dyn Fn(Option<JsonObject>) -> BoxFuture<'static, Result<CallToolResult, ToolError>>
        + Send
        + Sync,
>;

/// Box an async closure into a [`ToolHandlerFn`].
pub fn tool_handler<F, Fut>(handler: F) -> ToolHandlerFn
where
    F: Fn(Option<JsonObject>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CallToolResult, ToolError>> + Send + 'static,
{
    Arc::new(move |arguments: Option<JsonObject>| {
        Box::pin(handler(arguments)) as BoxFuture<'static, Result<CallToolResult, ToolError>>
    })
}

#[derive(Clone, Default)]
pub struct Toolset {
    tool_list: HashMap<String, Tool>,
    tool_handlers: HashMap<String, ToolHandlerFn>,
}

#[derive(Default)]
pub struct ToolsetBuilder {
    tool_list: HashMap<String, Tool>,
    tool_handlers: HashMap<String, ToolHandlerFn>,
}

impl ToolsetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool already registered under its name.
    pub fn add_tool(mut self, tool: Tool, handler: ToolHandlerFn) -> Self {
        let name = tool.name.to_string();
        self.tool_list.insert(name.clone(), tool);
        self.tool_handlers.insert(name, handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tool_list.contains_key(name)
    }

    pub fn build(self) -> Toolset {
        Toolset {
            tool_list: self.tool_list,
            tool_handlers: self.tool_handlers,
        }
    }
}

impl Toolset {
    pub fn builder() -> ToolsetBuilder {
        ToolsetBuilder::new()
    }

    pub fn get_tool(&self, name: &str) -> Option<&Tool> {
        self.tool_list.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tool_list.is_empty()
    }

    /// Run a tool. Handler failures come back as an error result, not an `Err`.
    pub fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<BoxFuture<'static, CallToolResult>, RouterError> {
        let handler = self
            .tool_handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RouterError::ToolNotFound(name.to_string()))?;
        let name = name.to_string();

        Ok(Box::pin(async move {
            match handler(arguments).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "tool call failed");
                    CallToolResult::error(vec![Content::text(e.to_string())])
                }
            }
        }))
    }

    /// All tools, ordered by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tool_list.values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }
}
