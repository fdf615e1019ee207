//! Host settings, loadable from JSON.
use mcp_ui_core::{
    model::JsonObject,
    ui::{
        apps::DisplayMode,
        bridge::{AppInfo, HostCapabilities, HostContext, LATEST_PROTOCOL_VERSION},
    },
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::HostError;

fn default_sandbox_tokens() -> Vec<String> {
    ["allow-scripts", "allow-same-origin", "allow-forms"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_display_modes() -> Vec<DisplayMode> {
    vec![DisplayMode::Inline]
}

fn default_protocol_version() -> String {
    LATEST_PROTOCOL_VERSION.to_string()
}

/// Where the sandbox proxy lives and what the iframe may do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxConfig {
    /// The proxy page; must be served from a different origin than the host
    pub url: Url,
    #[serde(default = "default_sandbox_tokens")]
    pub sandbox_tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions_policy: Option<String>,
}

impl SandboxConfig {
    pub fn new(url: Url) -> Result<Self, HostError> {
        let config = Self {
            url,
            sandbox_tokens: default_sandbox_tokens(),
            permissions_policy: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HostError> {
        match self.url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(HostError::Config(format!(
                "sandbox proxy URL must be http(s), got {scheme}: {}",
                self.url
            ))),
        }
    }

    /// The iframe `sandbox` attribute value.
    pub fn sandbox_attribute(&self) -> String {
        self.sandbox_tokens.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    pub host_info: AppInfo,
    /// Newest bridge version this host will speak
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// The first entry is the initial mode
    #[serde(default = "default_display_modes")]
    pub display_modes: Vec<DisplayMode>,
    pub sandbox: SandboxConfig,
}

impl HostConfig {
    pub fn new(host_info: AppInfo, sandbox: SandboxConfig) -> Self {
        Self {
            host_info,
            protocol_version: default_protocol_version(),
            theme: None,
            locale: None,
            time_zone: None,
            platform: None,
            display_modes: default_display_modes(),
            sandbox,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, HostError> {
        let config: Self = serde_json::from_str(json)?;
        config.sandbox.validate()?;
        if config.display_modes.is_empty() {
            return Err(HostError::Config("displayModes must not be empty".into()));
        }
        tracing::debug!(host = %config.host_info.name, "loaded host config");
        Ok(config)
    }

    pub fn initial_display_mode(&self) -> DisplayMode {
        self.display_modes.first().copied().unwrap_or_default()
    }

    /// The context handed to a view in its `ui/initialize` result.
    pub fn host_context(&self) -> HostContext {
        HostContext {
            theme: self.theme.clone(),
            display_mode: Some(self.initial_display_mode()),
            available_display_modes: Some(self.display_modes.clone()),
            locale: self.locale.clone(),
            time_zone: self.time_zone.clone(),
            platform: self.platform.clone(),
            ..Default::default()
        }
    }

    pub fn host_capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            open_links: Some(JsonObject::new()),
            server_tools: Some(JsonObject::new()),
            server_resources: Some(JsonObject::new()),
            logging: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_applies_defaults() {
        let config = HostConfig::from_json_str(
            r#"{
                "hostInfo": { "name": "chat-host", "version": "2.0.0" },
                "theme": "dark",
                "sandbox": { "url": "https://sandbox.example.net/proxy.html" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.protocol_version, LATEST_PROTOCOL_VERSION);
        assert_eq!(config.display_modes, vec![DisplayMode::Inline]);
        assert_eq!(
            config.sandbox.sandbox_attribute(),
            "allow-scripts allow-same-origin allow-forms"
        );

        let context = config.host_context();
        assert_eq!(context.theme.as_deref(), Some("dark"));
        assert_eq!(context.display_mode, Some(DisplayMode::Inline));
    }

    #[test]
    fn test_rejects_non_http_proxy() {
        let err = HostConfig::from_json_str(
            r#"{
                "hostInfo": { "name": "chat-host", "version": "2.0.0" },
                "sandbox": { "url": "ui://sandbox/proxy" }
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, HostError::Config(_)));

        let url = Url::parse("file:///tmp/proxy.html").unwrap();
        assert!(SandboxConfig::new(url).is_err());
    }

    #[test]
    fn test_rejects_empty_display_modes() {
        let err = HostConfig::from_json_str(
            r#"{
                "hostInfo": { "name": "chat-host", "version": "2.0.0" },
                "displayModes": [],
                "sandbox": { "url": "https://sandbox.example.net/" }
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, HostError::Config(_)));
    }
}
