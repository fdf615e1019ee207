//! An MCP App over stdio: `get-forecast` renders into `ui://weather/forecast`.
//!
//! Logs go to `logs/weather-app.log`; stdout carries the protocol.
use anyhow::Result;
use mcp_ui_core::{
    CallToolResult, Content, JsonObject, ReadResourceResult, ResourceContents, schema_for_type,
    ui::apps::{RESOURCE_MIME_TYPE, UiResourceCsp, UiResourceMeta, UiToolMeta},
};
use mcp_ui_server::{
    AppResourceConfig, AppRouter, AppToolConfig, CreateUiResourceOptions, ResourceError, Server,
    ToolError, UiContent, create_ui_resource, router::RouterService, transport,
};
use schemars::JsonSchema;
use serde_json::json;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const FORECAST_VIEW: &str = r#"<!doctype html>
<html>
  <body>
    <div id="forecast">Loading...</div>
    <script>
      window.addEventListener("message", (event) => {
        const msg = event.data;
        if (msg?.method === "ui/notifications/tool-result") {
          const data = msg.params.structuredContent ?? {};
          document.getElementById("forecast").textContent =
            `${data.city}: ${data.temperature}°C, ${data.conditions}`;
        }
      });
      window.parent.postMessage(
        { jsonrpc: "2.0", id: 1, method: "ui/initialize",
          params: { protocolVersion: "2025-11-21", clientInfo: { name: "forecast", version: "1.0.0" } } },
        "*",
      );
    </script>
  </body>
</html>"#;

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ForecastArgs {
    /// City to look up
    city: String,
}

async fn read_forecast_view(uri: String) -> Result<ReadResourceResult, ResourceError> {
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(uri, RESOURCE_MIME_TYPE, FORECAST_VIEW)],
    })
}

async fn get_forecast(arguments: Option<JsonObject>) -> Result<CallToolResult, ToolError> {
    let city = arguments
        .as_ref()
        .and_then(|args| args.get("city"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters("city is required".into()))?
        .to_string();

    let forecast = json!({ "city": city, "temperature": 21, "conditions": "sunny" });
    Ok(CallToolResult::success(vec![Content::text(format!(
        "{city}: 21°C and sunny"
    ))])
    .with_structured_content(forecast))
}

// Legacy mcp-ui flow: the UI resource travels inside the tool result.
async fn show_radar(_: Option<JsonObject>) -> Result<CallToolResult, ToolError> {
    let resource = create_ui_resource(CreateUiResourceOptions::new(
        "ui://weather/radar",
        UiContent::external_url("https://radar.example.com/embed"),
    ))
    .map_err(anyhow::Error::from)?;
    Ok(CallToolResult::success(vec![resource.into()]))
}

#[tokio::main]
async fn main() -> Result<()> {
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "weather-app.log");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(file_appender)
        .with_target(false)
        .with_ansi(false)
        .init();

    let router = AppRouter::builder("weather")
        .version("1.0.0")
        .instructions("Call get-forecast to show an interactive forecast card.")
        .register_app_resource(
            "forecast-view",
            "ui://weather/forecast",
            AppResourceConfig::new()
                .title("Forecast card")
                .ui(UiResourceMeta::default()
                    .with_csp(UiResourceCsp {
                        connect_domains: Some(vec!["https://api.weather.example".into()]),
                        ..Default::default()
                    })
                    .with_border(true)),
            read_forecast_view,
        )?
        .register_app_tool(
            "get-forecast",
            AppToolConfig::new("Get the forecast for a city")
                .title("Forecast")
                .input_schema(schema_for_type::<ForecastArgs>())
                .ui(UiToolMeta::new("ui://weather/forecast")),
            get_forecast,
        )?
        .register_tool(
            mcp_ui_core::Tool::new(
                "show-radar",
                "Show the radar map",
                mcp_ui_core::empty_object_schema(),
            ),
            show_radar,
        )?
        .build();

    tracing::info!("Starting weather app server");
    let server = Server::new(RouterService(router));
    Ok(server.run(transport::stdio()).await?)
}
