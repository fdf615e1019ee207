#![allow(dead_code)]

use mcp_ui_core::{
    CallToolResult, Content, JsonObject, ReadResourceResult, ResourceContents,
    ui::apps::{UiResourceMeta, UiToolMeta, Visibility},
};
use mcp_ui_server::{
    AppResourceConfig, AppRouter, AppToolConfig, CreateUiResourceOptions, ResourceError,
    ToolError, UiContent, create_ui_resource,
};
use serde_json::json;

pub async fn read_view(uri: String) -> Result<ReadResourceResult, ResourceError> {
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri,
            mime_type: None,
            text: "<html><body>counter</body></html>".into(),
            meta: None,
        }],
    })
}

pub async fn increment(arguments: Option<JsonObject>) -> Result<CallToolResult, ToolError> {
    let by = arguments
        .as_ref()
        .and_then(|args| args.get("by"))
        .and_then(|v| v.as_i64())
        .unwrap_or(1);
    Ok(CallToolResult::success(vec![Content::text(format!("+{by}"))])
        .with_structured_content(json!({ "by": by })))
}

pub async fn fail(_: Option<JsonObject>) -> Result<CallToolResult, ToolError> {
    Err(ToolError::ExecutionError("counter is frozen".into()))
}

/// A router with one model-visible app tool, one app-only tool, one failing
/// tool and a static mcp-ui resource.
pub fn counter_router() -> AppRouter {
    let banner = create_ui_resource(CreateUiResourceOptions::new(
        "ui://counter/banner",
        UiContent::raw_html("<h1>Counter</h1>"),
    ))
    .unwrap();

    AppRouter::builder("counter")
        .version("0.1.0")
        .instructions("A counter app")
        .register_app_resource(
            "counter-view",
            "ui://counter/view",
            AppResourceConfig::new()
                .title("Counter")
                .ui(UiResourceMeta::default().with_border(false)),
            read_view,
        )
        .unwrap()
        .register_app_tool(
            "increment",
            AppToolConfig::new("Increment the counter").ui(UiToolMeta::new("ui://counter/view")),
            increment,
        )
        .unwrap()
        .register_app_tool(
            "refresh",
            AppToolConfig::new("Refresh the view").ui(
                UiToolMeta::new("ui://counter/view").with_visibility(vec![Visibility::App]),
            ),
            increment,
        )
        .unwrap()
        .register_app_tool(
            "freeze",
            AppToolConfig::new("Always fails").ui(UiToolMeta::new("ui://counter/view")),
            fail,
        )
        .unwrap()
        .register_ui_resource(banner)
        .unwrap()
        .build()
}
