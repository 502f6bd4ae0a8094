//! Error types for the chat client.

use thiserror::Error;

/// Failure of a single chat request.
///
/// Every variant is recovered by the widget: the user sees a fixed fallback
/// text and the detail goes to the log.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The endpoint answered with a non-2xx status.
    #[error("server returned {status} {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty if the code has none.
        reason: String,
    },

    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The success body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
