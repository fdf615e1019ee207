//! Content blocks returned from tool calls.
use serde::{Deserialize, Serialize};

use super::{Meta, RawResource, ResourceContents};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextContent {
    pub text: String,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImageContent {
    /// The base64-encoded image
    pub data: String,
    pub mime_type: String,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmbeddedResource {
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub resource: ResourceContents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text(RawTextContent),
    Image(RawImageContent),
    Resource(RawEmbeddedResource),
    ResourceLink(RawResource),
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(RawTextContent {
            text: text.into(),
            meta: None,
        })
    }

    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Content::Image(RawImageContent {
            data: data.into(),
            mime_type: mime_type.into(),
            meta: None,
        })
    }

    pub fn resource(resource: ResourceContents) -> Self {
        Content::Resource(RawEmbeddedResource {
            meta: None,
            resource,
        })
    }

    pub fn json<S: Serialize>(value: S) -> Result<Self, serde_json::Error> {
        Ok(Content::text(serde_json::to_string(&value)?))
    }

    pub fn as_text(&self) -> Option<&RawTextContent> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&RawEmbeddedResource> {
        match self {
            Content::Resource(resource) => Some(resource),
            _ => None,
        }
    }
}
