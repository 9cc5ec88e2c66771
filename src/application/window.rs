//! Window filtering and ordering.
//!
//! Trims a chat's accumulated history to the requested inclusive interval
//! and puts it in deterministic chronological order.

use crate::domain::RawMessage;

/// Keeps messages with `start_ts <= timestamp <= end_ts`, sorted ascending
/// by timestamp. The sort is stable: equal timestamps keep their retrieval
/// order. An empty result is not an error; the caller skips the chat.
#[must_use]
pub fn filter_and_sort(messages: Vec<RawMessage>, start_ts: i64, end_ts: i64) -> Vec<RawMessage> {
    let mut in_window: Vec<RawMessage> = messages
        .into_iter()
        .filter(|m| m.timestamp >= start_ts && m.timestamp <= end_ts)
        .collect();

    in_window.sort_by_key(|m| m.timestamp);
    in_window
}
