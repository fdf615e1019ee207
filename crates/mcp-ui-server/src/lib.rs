//! Server side of mcp-ui: build UI resources and serve MCP Apps.
use futures::StreamExt;
use mcp_ui_core::protocol::{
    ErrorData, INTERNAL_ERROR, INVALID_REQUEST, JSONRPC_VERSION, JsonRpcError, JsonRpcMessage,
    JsonRpcRequest, JsonRpcResponse, PARSE_ERROR,
};
use tower_service::Service;
use tracing::Instrument;

mod errors;
pub use errors::{BoxError, ResourceError, RouterError, ServerError, ToolError, TransportError};

pub mod app;
pub use app::{AppResourceConfig, AppRouter, AppRouterBuilder, AppToolConfig};

pub mod router;
pub use router::{Router, RouterService};

pub mod toolset;
pub mod transport;
pub use transport::{ByteTransport, Transport};

pub use mcp_ui_core::{
    CreateUiResourceOptions, ResourceProps, UiContent, UiEncoding, UiMetadata, UiResource,
    create_ui_resource,
};

fn transport_error_data(error: &TransportError) -> ErrorData {
    let code = match error {
        TransportError::Json(_) | TransportError::InvalidMessage(_) | TransportError::Utf8(_) => {
            PARSE_ERROR
        }
        TransportError::Protocol(_) => INVALID_REQUEST,
        TransportError::Io(_) => INTERNAL_ERROR,
    };
    ErrorData::new(code, error.to_string(), None)
}

/// Serves JSON-RPC requests from a transport, one at a time.
pub struct Server<S> {
    service: S,
}

impl<S> Server<S>
where
    S: Service<JsonRpcRequest, Response = JsonRpcResponse> + Send,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Run until the transport reaches EOF.
    #[tracing::instrument(name = "mcp_server", skip_all)]
    pub async fn run<T>(self, mut transport: T) -> Result<(), ServerError>
    where
        T: Transport + Unpin,
    {
        let mut service = self.service;

        tracing::info!("Server started");
        while let Some(msg_result) = transport.next().await {
            let span = tracing::info_span!("message_processing");
            handle_message(&mut service, &mut transport, msg_result)
                .instrument(span)
                .await?;
        }

        tracing::info!("Transport closed, server stopping");
        Ok(())
    }
}

async fn handle_message<S, T>(
    service: &mut S,
    transport: &mut T,
    msg_result: Result<JsonRpcMessage, TransportError>,
) -> Result<(), ServerError>
where
    S: Service<JsonRpcRequest, Response = JsonRpcResponse> + Send,
    S::Error: Into<BoxError>,
    S::Future: Send,
    T: Transport + Unpin,
{
    let request = match msg_result {
        Ok(JsonRpcMessage::Request(request)) => request,
        Ok(JsonRpcMessage::Notification(notification)) => {
            tracing::debug!(method = %notification.method, "Received notification");
            return Ok(());
        }
        Ok(JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) | JsonRpcMessage::Nil) => {
            return Ok(());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read message");
            let error = JsonRpcMessage::Error(JsonRpcError {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id: None,
                error: transport_error_data(&e),
            });
            transport.write_message(error).await?;
            return Ok(());
        }
    };

    let id = request.id.clone();
    let request_json = serde_json::to_string(&request)
        .unwrap_or_else(|_| "Failed to serialize request".to_string());
    tracing::info!(
        request_id = %id,
        method = %request.method,
        json = %request_json,
        "Received request"
    );

    let response = match service.call(request).await {
        Ok(response) => response,
        Err(e) => {
            let error_msg = e.into().to_string();
            tracing::error!(error = %error_msg, "Request processing failed");
            JsonRpcResponse::error(id, ErrorData::internal_error(error_msg, None))
        }
    };

    let response_json = serde_json::to_string(&response)
        .unwrap_or_else(|_| "Failed to serialize response".to_string());
    tracing::info!(
        response_id = %response.id,
        is_error = response.is_error(),
        json = %response_json,
        "Sending response"
    );
    transport
        .write_message(JsonRpcMessage::Response(response))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_codes() {
        let invalid = TransportError::InvalidMessage("not an object".into());
        assert_eq!(transport_error_data(&invalid).code, PARSE_ERROR);
        let protocol = TransportError::Protocol("batch unsupported".into());
        assert_eq!(transport_error_data(&protocol).code, INVALID_REQUEST);
        let io = TransportError::Io(std::io::Error::other("closed"));
        assert_eq!(transport_error_data(&io).code, INTERNAL_ERROR);
    }
}
