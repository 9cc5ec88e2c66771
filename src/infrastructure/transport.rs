//! Messaging transport seam.
//!
//! The session itself (login, QR pairing, browser automation) lives behind
//! this trait. Every call may block on the wire and may fail; the engine
//! never assumes synchronous success.

use async_trait::async_trait;

use crate::domain::{ConversationHandle, RawMessage};

/// Lifecycle signals emitted by a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A QR challenge was issued; the session awaits pairing.
    QrChallenge,
    /// The session is connected and authenticated.
    Ready,
    /// Authentication failed; the session is unusable until re-paired.
    AuthFailure,
    /// The session dropped.
    Disconnected,
}

/// Options for one backward page fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Maximum messages to return.
    pub limit: usize,
    /// Return only messages strictly older than this message id.
    /// `None` on the first call returns the most recent messages.
    pub before: Option<String>,
}

/// Upstream message source. Batches are newest-first and never interleave
/// across chats.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Lists every chat visible to the account, in transport order.
    /// Includes broadcast/status pseudo-chats; callers filter those.
    async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationHandle>>;

    /// Looks up one chat by its serialized id.
    async fn get_conversation_by_id(
        &self,
        id: &str,
    ) -> anyhow::Result<Option<ConversationHandle>>;

    /// Fetches one page of messages for a chat, newest-first.
    async fn fetch_message_batch(
        &self,
        chat_id: &str,
        options: FetchOptions,
    ) -> anyhow::Result<Vec<RawMessage>>;
}
