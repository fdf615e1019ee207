//! Building UI resources for tool results.
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use super::{RemoteDomFramework, UiMetadata, UiMimeType};
use crate::{
    UiError,
    model::{Content, Meta, RawEmbeddedResource, ResourceContents},
};

pub const UI_SCHEME: &str = "ui://";

pub fn is_ui_uri(uri: &str) -> bool {
    uri.starts_with(UI_SCHEME)
}

/// What the view is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiContent {
    #[serde(rename_all = "camelCase")]
    RawHtml { html_string: String },
    #[serde(rename_all = "camelCase")]
    ExternalUrl { iframe_url: String },
    #[serde(rename_all = "camelCase")]
    RemoteDom {
        script: String,
        #[serde(default)]
        framework: RemoteDomFramework,
    },
}

impl UiContent {
    pub fn raw_html(html: impl Into<String>) -> Self {
        UiContent::RawHtml {
            html_string: html.into(),
        }
    }

    pub fn external_url(url: impl Into<String>) -> Self {
        UiContent::ExternalUrl {
            iframe_url: url.into(),
        }
    }

    pub fn remote_dom(script: impl Into<String>, framework: RemoteDomFramework) -> Self {
        UiContent::RemoteDom {
            script: script.into(),
            framework,
        }
    }

    pub fn mime_type(&self) -> UiMimeType {
        match self {
            UiContent::RawHtml { .. } => UiMimeType::Html,
            UiContent::ExternalUrl { .. } => UiMimeType::UriList,
            UiContent::RemoteDom { framework, .. } => UiMimeType::RemoteDom(*framework),
        }
    }

    fn into_payload(self) -> Result<String, UiError> {
        let (payload, what) = match self {
            UiContent::RawHtml { html_string } => (html_string, "htmlString"),
            UiContent::ExternalUrl { iframe_url } => {
                url::Url::parse(&iframe_url).map_err(|e| {
                    UiError::InvalidContent(format!("iframeUrl '{iframe_url}' is not a URL: {e}"))
                })?;
                (iframe_url, "iframeUrl")
            }
            UiContent::RemoteDom { script, .. } => (script, "script"),
        };
        if payload.trim().is_empty() {
            return Err(UiError::InvalidContent(format!("{what} must not be empty")));
        }
        Ok(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UiEncoding {
    #[default]
    Text,
    /// Standard base64 of the UTF-8 payload
    Blob,
}

/// Extra fields copied onto the resource entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUiResourceOptions {
    pub uri: String,
    pub content: UiContent,
    pub encoding: UiEncoding,
    pub ui_metadata: UiMetadata,
    pub metadata: Meta,
    pub resource_props: ResourceProps,
}

impl CreateUiResourceOptions {
    pub fn new(uri: impl Into<String>, content: UiContent) -> Self {
        Self {
            uri: uri.into(),
            content,
            encoding: UiEncoding::Text,
            ui_metadata: UiMetadata::default(),
            metadata: Meta::default(),
            resource_props: ResourceProps::default(),
        }
    }

    pub fn encoding(mut self, encoding: UiEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn ui_metadata(mut self, ui_metadata: UiMetadata) -> Self {
        self.ui_metadata = ui_metadata;
        self
    }

    pub fn metadata(mut self, metadata: Meta) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn resource_props(mut self, props: ResourceProps) -> Self {
        self.resource_props = props;
        self
    }
}

/// A ready-to-embed UI resource, serialized as an MCP `resource` content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiResource {
    #[serde(rename = "type")]
    kind: ResourceKind,
    pub resource: ResourceContents,
    #[serde(flatten)]
    pub props: ResourceProps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ResourceKind {
    Resource,
}

impl UiResource {
    pub fn uri(&self) -> &str {
        self.resource.uri()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.resource.mime_type()
    }

    pub fn ui_metadata(&self) -> UiMetadata {
        self.resource
            .meta()
            .map(UiMetadata::from_meta)
            .unwrap_or_default()
    }

    /// The payload as text, decoding blob encoding when needed.
    pub fn decoded_text(&self) -> Result<String, UiError> {
        decode_contents(&self.resource)
    }

    pub fn into_content(self) -> Content {
        Content::Resource(RawEmbeddedResource {
            meta: None,
            resource: self.resource,
        })
    }
}

impl From<UiResource> for Content {
    fn from(value: UiResource) -> Self {
        value.into_content()
    }
}

/// The text payload of resource contents, decoding base64 blobs.
pub fn decode_contents(contents: &ResourceContents) -> Result<String, UiError> {
    match contents {
        ResourceContents::TextResourceContents { text, .. } => Ok(text.clone()),
        ResourceContents::BlobResourceContents { blob, .. } => {
            let bytes = STANDARD.decode(blob.trim())?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

/// Build a UI resource to return from a tool call.
pub fn create_ui_resource(options: CreateUiResourceOptions) -> Result<UiResource, UiError> {
    let CreateUiResourceOptions {
        uri,
        content,
        encoding,
        ui_metadata,
        metadata,
        resource_props,
    } = options;

    if !is_ui_uri(&uri) {
        return Err(UiError::InvalidUri(uri));
    }
    let mime_type = content.mime_type().as_mime_string();
    let payload = content.into_payload()?;

    let mut meta = ui_metadata.to_meta();
    meta.extend_missing(metadata);
    let meta = (!meta.is_empty()).then_some(meta);

    let resource = match encoding {
        UiEncoding::Text => ResourceContents::TextResourceContents {
            uri,
            mime_type: Some(mime_type),
            text: payload,
            meta,
        },
        UiEncoding::Blob => ResourceContents::BlobResourceContents {
            uri,
            mime_type: Some(mime_type),
            blob: STANDARD.encode(payload.as_bytes()),
            meta,
        },
    };
    tracing::debug!(uri = %resource.uri(), ?encoding, "created UI resource");

    Ok(UiResource {
        kind: ResourceKind::Resource,
        resource,
        props: resource_props,
    })
}
