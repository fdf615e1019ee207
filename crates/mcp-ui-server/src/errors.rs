use mcp_ui_core::protocol::{
    ErrorData, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, RESOURCE_NOT_FOUND,
};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 sequence: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Registration error: {0}")]
    Registration(String),
}

impl From<RouterError> for ErrorData {
    fn from(err: RouterError) -> Self {
        let code = match &err {
            RouterError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RouterError::InvalidParams(_) | RouterError::ToolNotFound(_) => INVALID_PARAMS,
            RouterError::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
            RouterError::Internal(_) | RouterError::Registration(_) => INTERNAL_ERROR,
        };
        ErrorData::new(code, err.to_string(), None)
    }
}

/// Failure of a tool handler; reported to the client as an error result.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    ExecutionError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a resource read callback.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    ExecutionError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ResourceError> for RouterError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(uri) => RouterError::ResourceNotFound(uri),
            other => RouterError::Internal(other.to_string()),
        }
    }
}
