//! Domain layer - core types and error taxonomy.
//!
//! This layer contains pure request-scoped models and error types
//! without any external dependencies (transport, IO, etc.).

pub mod error;
pub mod models;

pub use error::{ExportError, Result};
pub use models::{
    ChatOutcome, ConversationHandle, ExportRecord, ExportSummary, ExtractionRequest, OutputFormat,
    RawMessage, Scope, StatusReport,
};
