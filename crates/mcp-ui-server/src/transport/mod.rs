use async_trait::async_trait;
use futures::Stream;
use mcp_ui_core::protocol::JsonRpcMessage;

use crate::TransportError;

mod stdio;
pub use stdio::{ByteTransport, stdio};

/// A bidirectional channel of JSON-RPC messages.
#[async_trait]
pub trait Transport: Stream<Item = Result<JsonRpcMessage, TransportError>> + Send {
    async fn write_message(&mut self, message: JsonRpcMessage) -> Result<(), TransportError>;
}
