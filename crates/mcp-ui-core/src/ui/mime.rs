use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::UiError;

pub const MIME_TYPE_HTML: &str = "text/html";
pub const MIME_TYPE_URI_LIST: &str = "text/uri-list";
pub const MIME_TYPE_REMOTE_DOM: &str = "application/vnd.mcp-ui.remote-dom+javascript";
pub const MIME_TYPE_MCP_APP: &str = "text/html;profile=mcp-app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemoteDomFramework {
    #[default]
    React,
    Webcomponents,
}

impl RemoteDomFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteDomFramework::React => "react",
            RemoteDomFramework::Webcomponents => "webcomponents",
        }
    }
}

/// The kinds of UI resource a host knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiMimeType {
    /// Raw HTML rendered through `srcdoc`
    Html,
    /// A URL to load into the iframe
    UriList,
    /// A remote DOM script for the given component framework
    RemoteDom(RemoteDomFramework),
    /// An MCP Apps view speaking the JSON-RPC bridge
    McpApp,
}

/// Split `type/subtype; k=v; ...` into the lowercased essence and its parameters.
fn split_mime(mime: &str) -> (String, Vec<(String, String)>) {
    let mut parts = mime.split(';');
    let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let params = parts
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            Some((
                key.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"').to_ascii_lowercase(),
            ))
        })
        .collect();
    (essence, params)
}

impl UiMimeType {
    pub fn parse(mime: &str) -> Result<Self, UiError> {
        let (essence, params) = split_mime(mime);
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        match essence.as_str() {
            MIME_TYPE_HTML => match param("profile") {
                Some("mcp-app") => Ok(UiMimeType::McpApp),
                _ => Ok(UiMimeType::Html),
            },
            // pre-release MCP Apps hosts used this spelling
            "text/html+mcp" => Ok(UiMimeType::McpApp),
            MIME_TYPE_URI_LIST => Ok(UiMimeType::UriList),
            MIME_TYPE_REMOTE_DOM => match param("framework") {
                None | Some("react") => Ok(UiMimeType::RemoteDom(RemoteDomFramework::React)),
                Some("webcomponents") => {
                    Ok(UiMimeType::RemoteDom(RemoteDomFramework::Webcomponents))
                }
                Some(_) => Err(UiError::UnknownMimeType(mime.to_string())),
            },
            _ => Err(UiError::UnknownMimeType(mime.to_string())),
        }
    }

    pub fn as_mime_string(&self) -> String {
        match self {
            UiMimeType::Html => MIME_TYPE_HTML.to_string(),
            UiMimeType::UriList => MIME_TYPE_URI_LIST.to_string(),
            UiMimeType::RemoteDom(framework) => {
                format!("{MIME_TYPE_REMOTE_DOM}; framework={}", framework.as_str())
            }
            UiMimeType::McpApp => MIME_TYPE_MCP_APP.to_string(),
        }
    }
}

impl Display for UiMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_mime_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(UiMimeType::parse("text/html").unwrap(), UiMimeType::Html);
        assert_eq!(
            UiMimeType::parse("text/uri-list").unwrap(),
            UiMimeType::UriList
        );
        assert_eq!(
            UiMimeType::parse("text/html;profile=mcp-app").unwrap(),
            UiMimeType::McpApp
        );
        assert_eq!(
            UiMimeType::parse("Text/HTML ; profile=\"mcp-app\"").unwrap(),
            UiMimeType::McpApp
        );
        assert_eq!(
            UiMimeType::parse("application/vnd.mcp-ui.remote-dom+javascript; framework=webcomponents")
                .unwrap(),
            UiMimeType::RemoteDom(RemoteDomFramework::Webcomponents)
        );
        assert_eq!(
            UiMimeType::parse("application/vnd.mcp-ui.remote-dom+javascript").unwrap(),
            UiMimeType::RemoteDom(RemoteDomFramework::React)
        );
    }

    #[test]
    fn test_parse_unknown_types() {
        assert!(matches!(
            UiMimeType::parse("application/json"),
            Err(UiError::UnknownMimeType(_))
        ));
        assert!(matches!(
            UiMimeType::parse("application/vnd.mcp-ui.remote-dom+javascript; framework=vue"),
            Err(UiError::UnknownMimeType(_))
        ));
    }

    #[test]
    fn test_render_remote_dom() {
        let mime = UiMimeType::RemoteDom(RemoteDomFramework::React);
        assert_eq!(
            mime.to_string(),
            "application/vnd.mcp-ui.remote-dom+javascript; framework=react"
        );
        assert_eq!(UiMimeType::parse(&mime.to_string()).unwrap(), mime);
    }
}
