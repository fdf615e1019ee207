/// Errors raised while building or interpreting UI resources.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("invalid UI resource URI '{0}': must start with 'ui://'")]
    InvalidUri(String),
    #[error("invalid UI resource content: {0}")]
    InvalidContent(String),
    #[error("unknown UI resource MIME type '{0}'")]
    UnknownMimeType(String),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded blob is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
