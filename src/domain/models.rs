//! Domain models for chat history extraction.
//!
//! These models are request-scoped: everything here is created when an
//! extraction request starts and dropped when it completes. Only the output
//! file outlives the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::{ExportError, Result};

/// Which chat(s) an extraction request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every chat the account can see, in transport listing order.
    AllChats,
    /// One chat, by raw (not yet normalized) identifier.
    SingleChat(String),
}

/// Output format for the export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per record, newline-delimited.
    #[default]
    Jsonl,
    /// Human-readable report with per-chat sections.
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jsonl => "jsonl",
            Self::Text => "txt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json" => Ok(Self::Jsonl),
            "text" | "txt" | "report" => Ok(Self::Text),
            _ => Err(format!("Unknown format: {s}. Use: jsonl, text")),
        }
    }
}

/// One extraction request: a scope, an inclusive time window, a format.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub scope: Scope,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub format: OutputFormat,
}

impl ExtractionRequest {
    /// Validates the request before any transport call is made.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the window is inverted or a single-chat
    /// scope carries an empty identifier.
    pub fn validate(&self) -> Result<()> {
        if self.window_start > self.window_end {
            return Err(ExportError::invalid_request(format!(
                "window start {} is after window end {}",
                self.window_start, self.window_end
            )));
        }
        if let Scope::SingleChat(id) = &self.scope {
            if id.trim().is_empty() {
                return Err(ExportError::invalid_request("chat identifier is empty"));
            }
        }
        Ok(())
    }

    /// Window lower bound as epoch seconds.
    #[must_use]
    pub fn start_ts(&self) -> i64 {
        self.window_start.timestamp()
    }

    /// Window upper bound as epoch seconds.
    #[must_use]
    pub fn end_ts(&self) -> i64 {
        self.window_end.timestamp()
    }
}

/// A resolved chat, held for the duration of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHandle {
    /// Serialized chat id, e.g. `551199999999@c.us`.
    pub id: String,
    /// Display name, when the transport knows one.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether this is a group chat.
    #[serde(default)]
    pub is_group: bool,
}

impl ConversationHandle {
    /// Display title: the name when set, otherwise the id.
    #[must_use]
    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// One message as returned by the transport, newest-first within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Opaque message id; monotonically older as pagination proceeds.
    pub id: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Sender chat id (the counterpart, or our own id for outgoing).
    pub sender_id: String,
    /// Author id for group messages.
    #[serde(default)]
    pub author_id: Option<String>,
    /// Text body, absent for pure media messages.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether the message carries a non-text payload.
    #[serde(default)]
    pub has_media: bool,
    /// Whether the account itself sent the message.
    #[serde(default)]
    pub is_from_self: bool,
}

/// One line of the export file, derived from an in-window `RawMessage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub conversation_id: String,
    pub conversation_title: String,
    pub sender_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub body: String,
}

/// Per-chat result reported in the success summary.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub id: String,
    pub title: String,
    /// Records written for this chat (zero-count chats are still listed).
    pub written: usize,
    /// True when pagination aborted early and older history may be missing.
    pub truncated: bool,
}

/// Success summary for one extraction request.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub output_file: PathBuf,
    pub chats: Vec<ChatOutcome>,
}

impl ExportSummary {
    /// Total records written across all chats.
    #[must_use]
    pub fn total_written(&self) -> usize {
        self.chats.iter().map(|c| c.written).sum()
    }
}

/// Gate status exposed to the front door.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub ready: bool,
}
