use mcp_ui_core::{
    UiError,
    protocol::{ErrorData, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("MCP client error: {0}")]
    Client(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool {0} has no UI resource")]
    NoUiResource(String),

    #[error("Invalid UI resource: {0}")]
    InvalidResource(String),

    #[error("Unsupported by this host: {0}")]
    Unsupported(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Ui(#[from] UiError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<&HostError> for ErrorData {
    fn from(err: &HostError) -> Self {
        let code = match err {
            HostError::Unsupported(_) => METHOD_NOT_FOUND,
            HostError::ToolNotFound(_) | HostError::Json(_) => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        };
        ErrorData::new(code, err.to_string(), None)
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge is closed")]
    Closed,

    #[error("Invalid bridge message: {0}")]
    InvalidMessage(String),
}
