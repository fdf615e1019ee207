//! Host side of mcp-ui: resolve a tool's UI resource, sandbox it and talk to
//! the view running inside.
//!
//! A host typically resolves a [`RenderPlan`] with an [`AppRenderer`], puts
//! the plan's content into a sandboxed iframe per its [`SandboxPolicy`], then
//! feeds every message the iframe posts into an [`AppBridge`] (MCP Apps) or a
//! [`UiActionDispatcher`] (mcp-ui UI actions) and posts back what they return.

mod error;
pub use error::{BridgeError, HostError};

pub mod actions;
pub use actions::UiActionDispatcher;

pub mod bridge;
pub use bridge::{AppBridge, BridgeState};

pub mod client;
pub use client::McpClient;

pub mod config;
pub use config::{HostConfig, SandboxConfig};

pub mod handlers;
pub use handlers::{AppHandlers, DefaultHandlers};

pub mod renderer;
pub use renderer::{AppRenderer, RenderMode, RenderPlan};

pub mod sandbox;
pub use sandbox::SandboxPolicy;
