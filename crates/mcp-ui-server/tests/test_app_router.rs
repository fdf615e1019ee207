mod common;

use mcp_ui_core::{
    model::LATEST_MCP_PROTOCOL_VERSION,
    protocol::{
        INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, RESOURCE_NOT_FOUND,
    },
    ui::apps::{EXTENSION_ID, RESOURCE_MIME_TYPE, RESOURCE_URI_META_KEY},
};
use mcp_ui_server::RouterService;
use serde_json::{Value, json};
use tower_service::Service;

async fn call(method: &str, params: Option<Value>) -> JsonRpcResponse {
    let mut service = RouterService(common::counter_router());
    service
        .call(JsonRpcRequest::new(1i64, method, params))
        .await
        .unwrap()
}

fn result(response: JsonRpcResponse) -> Value {
    assert!(!response.is_error(), "unexpected error: {:?}", response.error);
    response.result.unwrap()
}

#[tokio::test]
async fn test_initialize_advertises_apps_extension() {
    let value = result(
        call(
            "initialize",
            Some(json!({ "protocolVersion": "2025-06-18", "capabilities": {} })),
        )
        .await,
    );
    assert_eq!(value["serverInfo"]["name"], "counter");
    assert_eq!(value["serverInfo"]["version"], "0.1.0");
    assert_eq!(value["instructions"], "A counter app");
    assert!(value["capabilities"]["tools"].is_object());
    assert!(value["capabilities"]["resources"].is_object());
    assert_eq!(
        value["capabilities"]["experimental"][EXTENSION_ID]["mimeTypes"][0],
        RESOURCE_MIME_TYPE
    );
}

#[tokio::test]
async fn test_initialize_negotiates_protocol_version() {
    let value = result(
        call(
            "initialize",
            Some(json!({ "protocolVersion": "2025-03-26", "capabilities": {} })),
        )
        .await,
    );
    assert_eq!(value["protocolVersion"], "2025-03-26");

    let value = result(
        call(
            "initialize",
            Some(json!({ "protocolVersion": "2099-01-01", "capabilities": {} })),
        )
        .await,
    );
    assert_eq!(value["protocolVersion"], LATEST_MCP_PROTOCOL_VERSION);
}

#[tokio::test]
async fn test_tools_list_hides_app_only_tools() {
    let value = result(call("tools/list", None).await);
    let names: Vec<&str> = value["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["freeze", "increment"]);

    let increment = &value["tools"][1];
    assert_eq!(increment["_meta"]["ui"]["resourceUri"], "ui://counter/view");
    assert_eq!(increment["_meta"][RESOURCE_URI_META_KEY], "ui://counter/view");
}

#[tokio::test]
async fn test_app_only_tool_is_still_callable() {
    let value = result(
        call(
            "tools/call",
            Some(json!({ "name": "refresh", "arguments": { "by": 5 } })),
        )
        .await,
    );
    assert_eq!(value["structuredContent"]["by"], 5);
    assert_eq!(value["isError"], false);
}

#[tokio::test]
async fn test_tool_failure_is_an_error_result() {
    let value = result(call("tools/call", Some(json!({ "name": "freeze" }))).await);
    assert_eq!(value["isError"], true);
    assert_eq!(value["content"][0]["text"], "Execution failed: counter is frozen");
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let response = call("tools/call", Some(json!({ "name": "decrement" }))).await;
    assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
}

#[tokio::test]
async fn test_malformed_params_are_invalid_params() {
    let response = call("tools/call", Some(json!({ "arguments": {} }))).await;
    assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    let response = call("resources/read", None).await;
    assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
}

#[tokio::test]
async fn test_unknown_method() {
    let response = call("prompts/list", None).await;
    assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_resources_list() {
    let value = result(call("resources/list", None).await);
    let resources = value["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["uri"], "ui://counter/banner");
    assert_eq!(resources[0]["mimeType"], "text/html");
    assert_eq!(resources[1]["uri"], "ui://counter/view");
    assert_eq!(resources[1]["mimeType"], RESOURCE_MIME_TYPE);
    assert_eq!(resources[1]["title"], "Counter");
}

#[tokio::test]
async fn test_read_app_resource() {
    let value = result(
        call(
            "resources/read",
            Some(json!({ "uri": "ui://counter/view" })),
        )
        .await,
    );
    let contents = &value["contents"][0];
    assert_eq!(contents["mimeType"], RESOURCE_MIME_TYPE);
    assert_eq!(contents["_meta"]["ui"]["prefersBorder"], false);
    assert!(contents["text"].as_str().unwrap().contains("counter"));
}

#[tokio::test]
async fn test_read_static_ui_resource() {
    let value = result(
        call(
            "resources/read",
            Some(json!({ "uri": "ui://counter/banner" })),
        )
        .await,
    );
    assert_eq!(value["contents"][0]["text"], "<h1>Counter</h1>");
}

#[tokio::test]
async fn test_unknown_resource() {
    let response = call("resources/read", Some(json!({ "uri": "ui://counter/nope" }))).await;
    assert_eq!(response.error.unwrap().code, RESOURCE_NOT_FOUND);
}

#[tokio::test]
async fn test_ping() {
    assert_eq!(result(call("ping", None).await), json!({}));
}
