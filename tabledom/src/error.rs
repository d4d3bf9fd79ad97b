/// Errors from parsing markup fragments.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Malformed markup at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    #[error("Unexpected closing tag </{0}>")]
    UnexpectedClose(String),
}

/// Errors from mutating a document.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Cannot replace the document root")]
    RootReplacement,

    #[error(transparent)]
    Markup(#[from] MarkupError),
}
