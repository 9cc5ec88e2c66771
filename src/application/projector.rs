//! Record projection.
//!
//! Pure mapping from raw messages to export records: title fallback, sender
//! labeling, and placeholder substitution for non-text payloads.

use crate::domain::{ConversationHandle, ExportRecord, RawMessage};
use crate::infrastructure::{EMPTY_BODY_PLACEHOLDER, MEDIA_PLACEHOLDER};

/// Maps one in-window message to an export record.
///
/// Sender label precedence: a self-sent message always gets `self_label`,
/// even in a group where `author_id` is also set; otherwise the group author
/// id when present, otherwise the sender id.
#[must_use]
pub fn project(handle: &ConversationHandle, message: &RawMessage, self_label: &str) -> ExportRecord {
    let sender_label = if message.is_from_self {
        self_label.to_string()
    } else {
        message
            .author_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&message.sender_id)
            .to_string()
    };

    let body = if message.has_media {
        MEDIA_PLACEHOLDER.to_string()
    } else {
        match message.body.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => EMPTY_BODY_PLACEHOLDER.to_string(),
        }
    };

    ExportRecord {
        conversation_id: handle.id.clone(),
        conversation_title: handle.title().to_string(),
        sender_label,
        author_id: message.author_id.clone(),
        timestamp: message.timestamp,
        body,
    }
}
