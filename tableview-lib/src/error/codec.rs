//! Filter wire-format error types

/// Errors decoding or encoding the opaque `filters` parameter.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid UTF-8 in filter payload")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid filter JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Condition(#[from] super::ConditionError),
}
