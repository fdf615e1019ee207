use serde::{Deserialize, Serialize};

use super::Meta;

/// A resource entry as advertised by `resources/list`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawResource {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size of the raw content in bytes, before any base64 encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl RawResource {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            title: None,
            description: None,
            mime_type: None,
            size: None,
            meta: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ResourceContents {
    #[serde(rename_all = "camelCase")]
    TextResourceContents {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        text: String,
        #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
    #[serde(rename_all = "camelCase")]
    BlobResourceContents {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        blob: String,
        #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
}

impl ResourceContents {
    pub fn text(
        uri: impl Into<String>,
        mime_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::TextResourceContents {
            uri: uri.into(),
            mime_type: Some(mime_type.into()),
            text: text.into(),
            meta: None,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Self::TextResourceContents { uri, .. } | Self::BlobResourceContents { uri, .. } => uri,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::TextResourceContents { mime_type, .. }
            | Self::BlobResourceContents { mime_type, .. } => mime_type.as_deref(),
        }
    }

    pub fn meta(&self) -> Option<&Meta> {
        match self {
            Self::TextResourceContents { meta, .. } | Self::BlobResourceContents { meta, .. } => {
                meta.as_ref()
            }
        }
    }

    pub fn with_meta(mut self, new_meta: Meta) -> Self {
        match &mut self {
            Self::TextResourceContents { meta, .. } | Self::BlobResourceContents { meta, .. } => {
                *meta = Some(new_meta);
            }
        }
        self
    }

    /// Fill in the MIME type when the producer left it out.
    pub fn with_default_mime_type(mut self, default: &str) -> Self {
        match &mut self {
            Self::TextResourceContents { mime_type, .. }
            | Self::BlobResourceContents { mime_type, .. } => {
                if mime_type.is_none() {
                    *mime_type = Some(default.to_string());
                }
            }
        }
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadResourceRequestParams {
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesResult {
    pub resources: Vec<RawResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
