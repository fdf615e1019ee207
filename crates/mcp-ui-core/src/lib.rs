//! Core types shared by the mcp-ui server and host SDKs.
//!
//! The crate is split in three layers:
//! - [`protocol`]: the JSON-RPC 2.0 envelope used both on the MCP wire and on
//!   the postMessage bridge between a host and an embedded app
//! - [`model`]: the subset of MCP payloads (tools, resources, content) that UI
//!   resources travel in
//! - [`ui`]: UI resources, their MIME types and metadata, mcp-ui UI actions and
//!   the MCP Apps bridge messages

mod error;
pub use error::UiError;

pub mod model;
pub mod protocol;
pub mod ui;

pub use model::*;
pub use ui::{
    CreateUiResourceOptions, ResourceProps, UiContent, UiEncoding, UiMetadata, UiMimeType,
    UiResource, create_ui_resource,
};
