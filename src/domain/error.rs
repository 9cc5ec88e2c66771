//! Domain-level error types for wa-export.
//!
//! All errors are typed with `thiserror` and provide meaningful context
//! without exposing internal details to end users. Per-chat fetch failures
//! are deliberately *not* represented here: they are logged and recorded in
//! the chat outcome, never escalated to a request-level error.

use thiserror::Error;

/// Request-level errors. Any of these aborts the extraction request.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The session gate is closed; no transport call was made.
    #[error("session is not ready; scan the QR code and wait for the ready signal")]
    NotReady,

    /// Another extraction request currently owns the session.
    #[error("an extraction request is already in flight")]
    Busy,

    /// The request itself is malformed (bad window, empty identifier).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Identifier normalization produced an empty string.
    #[error("invalid chat identifier: {input:?}")]
    InvalidIdentifier { input: String },

    /// Single-chat lookup returned nothing for the normalized id.
    #[error("chat not found: {id}")]
    ConversationNotFound { id: String },

    /// The transport failed while resolving the request scope.
    #[error("failed to resolve chats: {message}")]
    ResolutionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening or appending to the output file failed. Partial output is
    /// retained on disk; the caller must treat it as invalid.
    #[error("failed to write export file: {message}")]
    SinkWrite {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration or environment error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO operation outside the sink failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl ExportError {
    /// Create an `InvalidRequest` error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a `ResolutionFailed` error from a transport error.
    pub fn resolution(err: anyhow::Error) -> Self {
        Self::ResolutionFailed {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }

    /// Create a `SinkWrite` error with context.
    pub fn sink(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::SinkWrite {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `ExportError`.
pub type Result<T> = std::result::Result<T, ExportError>;
