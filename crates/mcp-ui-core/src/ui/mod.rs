//! UI resources and the messages exchanged with the views that render them.
//!
//! Two generations of the protocol are covered:
//! - mcp-ui resources (`text/html`, `text/uri-list`, remote DOM scripts) whose
//!   views talk to the host with [`action`] messages
//! - MCP Apps (SEP-1865) resources (`text/html;profile=mcp-app`) linked from
//!   tools through [`apps`] metadata, whose views speak the JSON-RPC
//!   [`bridge`] protocol

pub mod action;
pub mod apps;
pub mod bridge;
mod metadata;
pub mod mime;
mod resource;

pub use metadata::{UI_METADATA_PREFIX, UiMetadata};
pub use mime::{RemoteDomFramework, UiMimeType};
pub use resource::{
    CreateUiResourceOptions, ResourceProps, UI_SCHEME, UiContent, UiEncoding, UiResource,
    create_ui_resource, decode_contents, is_ui_uri,
};
