mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{MockClient, VIEW_HTML, bridge, host_config, notification, request, view_plan};
use mcp_ui_core::{
    model::{CallToolResult, Content, ResourceContents},
    ui::{
        apps::{DisplayMode, RESOURCE_MIME_TYPE, UiResourceCsp, UiResourceMeta},
        bridge::{LATEST_PROTOCOL_VERSION, MessageParams, UpdateModelContextParams, methods},
    },
};
use mcp_ui_host::{AppBridge, AppHandlers, BridgeError, BridgeState, HostError};
use serde_json::{Value, json};

const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

async fn initialized(bridge: &mut AppBridge) {
    bridge
        .handle_message(notification(methods::SANDBOX_PROXY_READY, None))
        .await
        .unwrap();
    bridge
        .handle_message(request(
            1,
            methods::INITIALIZE,
            json!({
                "protocolVersion": LATEST_PROTOCOL_VERSION,
                "clientInfo": { "name": "counter-view", "version": "0.1.0" }
            }),
        ))
        .await
        .unwrap();
    bridge
        .handle_message(notification(methods::INITIALIZED, None))
        .await
        .unwrap();
    assert_eq!(bridge.state(), BridgeState::Initialized);
}

async fn call(bridge: &mut AppBridge, message: Value) -> Value {
    let mut replies = bridge.handle_message(message).await.unwrap();
    assert_eq!(replies.len(), 1, "expected one reply, got {replies:?}");
    replies.remove(0)
}

#[tokio::test]
async fn test_proxy_ready_delivers_the_view() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);
    assert_eq!(bridge.state(), BridgeState::AwaitingProxy);

    let reply = call(&mut bridge, notification(methods::SANDBOX_PROXY_READY, None)).await;
    assert_eq!(reply["method"], methods::SANDBOX_RESOURCE_READY);
    assert_eq!(reply["params"]["html"], VIEW_HTML);
    assert_eq!(
        reply["params"]["sandbox"],
        "allow-scripts allow-same-origin allow-forms"
    );
    assert_eq!(
        reply["params"]["csp"]["connectDomains"],
        json!(["https://api.counter.dev"])
    );
    assert_eq!(bridge.state(), BridgeState::Loaded);

    // a second ready is ignored
    let replies = bridge
        .handle_message(notification(methods::SANDBOX_PROXY_READY, None))
        .await
        .unwrap();
    assert!(replies.is_empty());
}

#[tokio::test]
async fn test_initialize_negotiates_version() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client.clone());

    let reply = call(
        &mut bridge,
        request(
            1,
            methods::INITIALIZE,
            json!({
                "protocolVersion": "2025-06-18",
                "clientInfo": { "name": "counter-view", "version": "0.1.0" }
            }),
        ),
    )
    .await;
    assert_eq!(reply["id"], 1);
    let result = &reply["result"];
    assert_eq!(result["protocolVersion"], "2025-06-18");
    assert_eq!(result["hostInfo"]["name"], "test-host");
    assert_eq!(result["hostContext"]["theme"], "dark");
    assert_eq!(result["hostContext"]["displayMode"], "inline");
    assert_eq!(bridge.state(), BridgeState::Initializing);
    assert_eq!(bridge.protocol_version(), Some("2025-06-18"));
    assert_eq!(bridge.app_info().unwrap().name, "counter-view");

    let reply = call(
        &mut bridge,
        request(2, methods::INITIALIZE, json!({ "protocolVersion": "2025-06-18" })),
    )
    .await;
    assert_eq!(reply["error"]["code"], INVALID_REQUEST);

    let mut fresh = common::bridge(client);
    let reply = call(
        &mut fresh,
        request(1, methods::INITIALIZE, json!({ "protocolVersion": "1999-01-01" })),
    )
    .await;
    assert_eq!(reply["result"]["protocolVersion"], LATEST_PROTOCOL_VERSION);
}

#[tokio::test]
async fn test_queued_input_is_flushed_before_result() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);

    let result = CallToolResult::success(vec![Content::text("count is 1")]);
    assert!(bridge.send_tool_result(result).is_empty());
    assert!(bridge.send_tool_input(json!({ "step": 1 })).is_empty());

    bridge
        .handle_message(notification(methods::SANDBOX_PROXY_READY, None))
        .await
        .unwrap();
    bridge
        .handle_message(request(
            1,
            methods::INITIALIZE,
            json!({ "protocolVersion": LATEST_PROTOCOL_VERSION }),
        ))
        .await
        .unwrap();
    let flushed = bridge
        .handle_message(notification(methods::INITIALIZED, None))
        .await
        .unwrap();

    let methods_sent: Vec<_> = flushed.iter().map(|m| m["method"].clone()).collect();
    assert_eq!(
        methods_sent,
        vec![json!(methods::TOOL_INPUT), json!(methods::TOOL_RESULT)]
    );
    assert_eq!(flushed[0]["params"]["arguments"]["step"], 1);
    assert_eq!(flushed[1]["params"]["content"][0]["text"], "count is 1");

    // once initialized, messages go straight out
    let sent = bridge.send_tool_cancelled(Some("user closed".into()));
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["params"]["reason"], "user closed");
}

#[tokio::test]
async fn test_tools_call_respects_visibility() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client.clone());
    initialized(&mut bridge).await;

    let reply = call(
        &mut bridge,
        request(2, methods::TOOLS_CALL, json!({ "name": "refresh", "arguments": {} })),
    )
    .await;
    assert_eq!(reply["result"]["content"][0]["text"], "refresh done");

    let reply = call(
        &mut bridge,
        request(3, methods::TOOLS_CALL, json!({ "name": "increment" })),
    )
    .await;
    assert_eq!(reply["result"]["content"][0]["text"], "increment done");

    let reply = call(
        &mut bridge,
        request(4, methods::TOOLS_CALL, json!({ "name": "reset" })),
    )
    .await;
    assert_eq!(reply["error"]["code"], INVALID_PARAMS);

    let reply = call(
        &mut bridge,
        request(5, methods::TOOLS_CALL, json!({ "name": "missing" })),
    )
    .await;
    assert_eq!(reply["error"]["code"], INVALID_PARAMS);

    assert_eq!(client.calls(), vec!["refresh", "increment"]);
}

#[tokio::test]
async fn test_resources_read_is_proxied() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);
    initialized(&mut bridge).await;

    let reply = call(
        &mut bridge,
        request(2, methods::RESOURCES_READ, json!({ "uri": common::VIEW_URI })),
    )
    .await;
    assert_eq!(reply["result"]["contents"][0]["text"], VIEW_HTML);
}

struct FullscreenHandlers;

#[async_trait]
impl AppHandlers for FullscreenHandlers {
    async fn on_request_display_mode(&self, mode: DisplayMode) -> Option<DisplayMode> {
        Some(mode)
    }
}

#[tokio::test]
async fn test_display_mode_requests() {
    let client = Arc::new(MockClient::counter());

    // the default handlers keep the current mode
    let mut bridge = common::bridge(client.clone());
    initialized(&mut bridge).await;
    let reply = call(
        &mut bridge,
        request(2, methods::REQUEST_DISPLAY_MODE, json!({ "mode": "fullscreen" })),
    )
    .await;
    assert_eq!(reply["result"]["mode"], "inline");

    let plan = view_plan(&client);
    let mut bridge = AppBridge::new(host_config(), plan, client, Arc::new(FullscreenHandlers));
    initialized(&mut bridge).await;
    let reply = call(
        &mut bridge,
        request(2, methods::REQUEST_DISPLAY_MODE, json!({ "mode": "fullscreen" })),
    )
    .await;
    assert_eq!(reply["result"]["mode"], "fullscreen");
    assert_eq!(bridge.display_mode(), DisplayMode::Fullscreen);

    // pip is not offered by this host
    let reply = call(
        &mut bridge,
        request(3, methods::REQUEST_DISPLAY_MODE, json!({ "mode": "pip" })),
    )
    .await;
    assert_eq!(reply["result"]["mode"], "fullscreen");
}

#[tokio::test]
async fn test_unknown_and_unsupported_requests() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);
    initialized(&mut bridge).await;

    let reply = call(&mut bridge, request(2, "ui/teleport", json!({}))).await;
    assert_eq!(reply["error"]["code"], METHOD_NOT_FOUND);

    // DefaultHandlers refuse to open links
    let reply = call(
        &mut bridge,
        request(3, methods::OPEN_LINK, json!({ "url": "https://example.com" })),
    )
    .await;
    assert_eq!(reply["error"]["code"], METHOD_NOT_FOUND);

    let reply = call(&mut bridge, request(4, methods::PING, json!({}))).await;
    assert_eq!(reply["result"], json!({}));

    let err = bridge.handle_message(json!("not a message")).await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidMessage(_)));
}

#[tokio::test]
async fn test_teardown_closes_after_view_answers() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);
    initialized(&mut bridge).await;

    let sent = bridge.teardown(Some("conversation ended".into())).unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["method"], methods::RESOURCE_TEARDOWN);
    assert_eq!(sent[0]["params"]["reason"], "conversation ended");
    assert_eq!(bridge.state(), BridgeState::TearingDown);

    // nothing else reaches a view that is going away
    assert!(bridge.send_tool_input(json!({})).is_empty());

    let id = sent[0]["id"].clone();
    let replies = bridge
        .handle_message(json!({ "jsonrpc": "2.0", "id": id, "result": {} }))
        .await
        .unwrap();
    assert!(replies.is_empty());
    assert_eq!(bridge.state(), BridgeState::Closed);

    assert!(matches!(
        bridge.handle_message(notification(methods::INITIALIZED, None)).await,
        Err(BridgeError::Closed)
    ));
    assert!(matches!(bridge.teardown(None), Err(BridgeError::Closed)));
}

#[tokio::test]
async fn test_teardown_before_initialize_closes_at_once() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);
    assert!(bridge.teardown(None).unwrap().is_empty());
    assert_eq!(bridge.state(), BridgeState::Closed);
}

#[tokio::test]
async fn test_host_context_changes_are_announced() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);

    let mut context = bridge.host_context().clone();
    context.theme = Some("light".into());
    assert!(bridge.set_host_context(context.clone()).is_empty());

    initialized(&mut bridge).await;
    context.theme = Some("dark".into());
    let sent = bridge.set_host_context(context);
    assert_eq!(sent[0]["method"], methods::HOST_CONTEXT_CHANGED);
    assert_eq!(sent[0]["params"]["theme"], "dark");
}

#[tokio::test]
async fn test_host_context_set_while_initializing_is_delivered() {
    let client = Arc::new(MockClient::counter());
    let mut bridge = bridge(client);

    bridge
        .handle_message(notification(methods::SANDBOX_PROXY_READY, None))
        .await
        .unwrap();
    let reply = call(
        &mut bridge,
        request(1, methods::INITIALIZE, json!({ "protocolVersion": LATEST_PROTOCOL_VERSION })),
    )
    .await;
    assert_eq!(reply["result"]["hostContext"]["theme"], "dark");
    assert_eq!(bridge.state(), BridgeState::Initializing);

    let mut context = bridge.host_context().clone();
    context.theme = Some("sepia".into());
    assert!(bridge.set_host_context(context.clone()).is_empty());
    context.theme = Some("light".into());
    assert!(bridge.set_host_context(context).is_empty());

    let flushed = bridge
        .handle_message(notification(methods::INITIALIZED, None))
        .await
        .unwrap();
    // only the latest context is sent
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0]["method"], methods::HOST_CONTEXT_CHANGED);
    assert_eq!(flushed[0]["params"]["theme"], "light");
}

#[tokio::test]
async fn test_resource_ready_forwards_only_valid_csp_sources() {
    let mut client = MockClient::counter();
    let meta = UiResourceMeta::default().with_csp(UiResourceCsp {
        connect_domains: Some(vec![
            "https://api.counter.dev".into(),
            "https://evil.example.com; script-src *".into(),
        ]),
        ..Default::default()
    });
    client.resources[0] = ResourceContents::text(common::VIEW_URI, RESOURCE_MIME_TYPE, VIEW_HTML)
        .with_meta(meta.to_meta());
    let mut bridge = bridge(Arc::new(client));

    let reply = call(&mut bridge, notification(methods::SANDBOX_PROXY_READY, None)).await;
    assert_eq!(
        reply["params"]["csp"]["connectDomains"],
        json!(["https://api.counter.dev"])
    );
    assert!(!reply.to_string().contains("evil"));
}

#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    SizeChanged(Option<f64>, Option<f64>),
    Message(MessageParams),
    ModelContext(UpdateModelContextParams),
}

#[derive(Default)]
struct RecordingHandlers {
    recorded: Mutex<Vec<Recorded>>,
}

impl RecordingHandlers {
    fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppHandlers for RecordingHandlers {
    async fn on_size_changed(&self, width: Option<f64>, height: Option<f64>) {
        self.recorded
            .lock()
            .unwrap()
            .push(Recorded::SizeChanged(width, height));
    }

    async fn on_message(&self, params: MessageParams) -> Result<(), HostError> {
        self.recorded.lock().unwrap().push(Recorded::Message(params));
        Ok(())
    }

    async fn on_update_model_context(
        &self,
        params: UpdateModelContextParams,
    ) -> Result<(), HostError> {
        self.recorded
            .lock()
            .unwrap()
            .push(Recorded::ModelContext(params));
        Ok(())
    }
}

fn recording_bridge() -> (AppBridge, Arc<RecordingHandlers>) {
    let client = Arc::new(MockClient::counter());
    let handlers = Arc::new(RecordingHandlers::default());
    let plan = view_plan(&client);
    let bridge = AppBridge::new(host_config(), plan, client, handlers.clone());
    (bridge, handlers)
}

#[tokio::test]
async fn test_view_messages_reach_the_handlers() {
    let (mut bridge, handlers) = recording_bridge();
    initialized(&mut bridge).await;

    let replies = bridge
        .handle_message(notification(
            methods::SIZE_CHANGED,
            Some(json!({ "width": 320.5, "height": 240 })),
        ))
        .await
        .unwrap();
    assert!(replies.is_empty());

    let reply = call(
        &mut bridge,
        request(
            2,
            methods::MESSAGE,
            json!({ "role": "user", "content": [{ "type": "text", "text": "more please" }] }),
        ),
    )
    .await;
    assert_eq!(reply["result"], json!({}));

    let reply = call(
        &mut bridge,
        request(
            3,
            methods::UPDATE_MODEL_CONTEXT,
            json!({ "structuredContent": { "count": 4 } }),
        ),
    )
    .await;
    assert_eq!(reply["result"], json!({}));

    assert_eq!(
        handlers.recorded(),
        vec![
            Recorded::SizeChanged(Some(320.5), Some(240.0)),
            Recorded::Message(MessageParams {
                role: "user".into(),
                content: json!([{ "type": "text", "text": "more please" }]),
            }),
            Recorded::ModelContext(UpdateModelContextParams {
                content: None,
                structured_content: Some(json!({ "count": 4 })),
            }),
        ]
    );
}

#[tokio::test]
async fn test_flush_order_is_partial_input_then_result() {
    let (mut bridge, _handlers) = recording_bridge();

    let result = CallToolResult::success(vec![Content::text("count is 2")]);
    assert!(bridge.send_tool_result(result).is_empty());
    assert!(bridge.send_tool_input_partial(json!({ "by": 1 })).is_empty());
    assert!(bridge.send_tool_input(json!({ "by": 2 })).is_empty());

    bridge
        .handle_message(notification(methods::SANDBOX_PROXY_READY, None))
        .await
        .unwrap();
    bridge
        .handle_message(request(
            1,
            methods::INITIALIZE,
            json!({ "protocolVersion": LATEST_PROTOCOL_VERSION }),
        ))
        .await
        .unwrap();
    let flushed = bridge
        .handle_message(notification(methods::INITIALIZED, None))
        .await
        .unwrap();

    let methods_sent: Vec<_> = flushed.iter().map(|m| m["method"].clone()).collect();
    assert_eq!(
        methods_sent,
        vec![
            json!(methods::TOOL_INPUT_PARTIAL),
            json!(methods::TOOL_INPUT),
            json!(methods::TOOL_RESULT)
        ]
    );
    assert_eq!(flushed[0]["params"]["arguments"]["by"], 1);
    assert_eq!(flushed[1]["params"]["arguments"]["by"], 2);
}
