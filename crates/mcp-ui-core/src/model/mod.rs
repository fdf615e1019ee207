//! The MCP payloads a UI resource travels in.
mod capabilities;
mod content;
mod meta;
mod resource;
mod tool;

pub use capabilities::*;
pub use content::*;
pub use meta::*;
pub use resource::*;
pub use tool::*;

pub type JsonObject = serde_json::Map<String, serde_json::Value>;
