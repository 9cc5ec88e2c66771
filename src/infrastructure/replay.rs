//! Snapshot-backed transport.
//!
//! Reads a captured JSON snapshot of chats and messages and serves it
//! through the `MessageTransport` trait, page by page. Used for offline
//! exports and as the scripted source in tests.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{ConversationHandle, ExportError, RawMessage, Result};

use super::transport::{FetchOptions, MessageTransport};

/// One chat in a snapshot file: a handle plus its full message history.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotChat {
    #[serde(flatten)]
    pub handle: ConversationHandle,
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    chats: Vec<SnapshotChat>,
}

/// Transport adapter over a snapshot file.
#[derive(Debug)]
pub struct ReplayTransport {
    chats: Vec<SnapshotChat>,
}

impl ReplayTransport {
    /// Opens and parses a snapshot file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExportError::io(format!("Failed to read snapshot: {}", path.display()), e)
        })?;

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            ExportError::Config {
                message: format!("Failed to parse snapshot {}: {e}", path.display()),
            }
        })?;

        tracing::debug!(
            chats = snapshot.chats.len(),
            path = %path.display(),
            "loaded snapshot"
        );

        Ok(Self::from_chats(snapshot.chats))
    }

    /// Builds a transport from already-parsed chats.
    #[must_use]
    pub fn from_chats(mut chats: Vec<SnapshotChat>) -> Self {
        // Serve pages newest-first, the way the live transport does.
        for chat in &mut chats {
            chat.messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
        Self { chats }
    }

    fn chat(&self, id: &str) -> Option<&SnapshotChat> {
        self.chats.iter().find(|c| c.handle.id == id)
    }
}

#[async_trait]
impl MessageTransport for ReplayTransport {
    async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationHandle>> {
        Ok(self.chats.iter().map(|c| c.handle.clone()).collect())
    }

    async fn get_conversation_by_id(
        &self,
        id: &str,
    ) -> anyhow::Result<Option<ConversationHandle>> {
        Ok(self.chat(id).map(|c| c.handle.clone()))
    }

    async fn fetch_message_batch(
        &self,
        chat_id: &str,
        options: FetchOptions,
    ) -> anyhow::Result<Vec<RawMessage>> {
        let chat = self
            .chat(chat_id)
            .ok_or_else(|| anyhow::anyhow!("unknown chat: {chat_id}"))?;

        let from = match &options.before {
            None => 0,
            Some(before) => {
                let pos = chat
                    .messages
                    .iter()
                    .position(|m| &m.id == before)
                    .ok_or_else(|| anyhow::anyhow!("unknown cursor message: {before}"))?;
                pos + 1
            }
        };

        Ok(chat
            .messages
            .iter()
            .skip(from)
            .take(options.limit)
            .cloned()
            .collect())
    }
}
