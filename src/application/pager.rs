//! Backward pager: the core history-retrieval loop.
//!
//! Pages one chat's history from newest to oldest until the requested
//! window's lower bound is covered or the history is exhausted. Each
//! iteration either strictly lowers the oldest-seen timestamp or ends on an
//! empty batch, so the loop terminates for any finite history.

use tokio::time::sleep;

use crate::domain::RawMessage;
use crate::infrastructure::config::PagerConfig;
use crate::infrastructure::{FetchOptions, MessageTransport};

/// Everything one chat's pagination produced.
#[derive(Debug, Default)]
pub struct PagedHistory {
    /// Accumulated messages, in retrieval order (newest batches first).
    pub messages: Vec<RawMessage>,
    /// True when a fetch failed and older history may be missing. What was
    /// already accumulated is kept.
    pub truncated: bool,
}

/// Pages backward through one chat until `window_start_ts` is covered.
///
/// A fetch error aborts pagination for this chat only: the accumulated
/// messages are returned with `truncated` set and a warning is logged. The
/// caller's request keeps going.
pub async fn collect_history(
    transport: &dyn MessageTransport,
    chat_id: &str,
    window_start_ts: i64,
    config: &PagerConfig,
) -> PagedHistory {
    let mut history = PagedHistory::default();
    let mut before: Option<String> = None;
    let mut oldest_seen = i64::MAX;
    let mut pages = 0_u32;

    loop {
        let options = FetchOptions {
            limit: config.batch_size,
            before: before.clone(),
        };

        let batch = match transport.fetch_message_batch(chat_id, options).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(
                    chat = %chat_id,
                    pages,
                    kept = history.messages.len(),
                    error = %e,
                    "page fetch failed; keeping what was accumulated"
                );
                history.truncated = true;
                return history;
            }
        };

        if batch.is_empty() {
            tracing::debug!(chat = %chat_id, pages, "reached start of history");
            return history;
        }

        pages += 1;

        // Batches are newest-first; the last entry is the oldest.
        let oldest = &batch[batch.len() - 1];
        before = Some(oldest.id.clone());
        oldest_seen = oldest.timestamp;

        history.messages.extend(batch);

        if oldest_seen <= window_start_ts {
            tracing::debug!(
                chat = %chat_id,
                pages,
                oldest_seen,
                "window lower bound covered"
            );
            return history;
        }

        // Courtesy pause before the next fetch; skipping it risks upstream
        // throttling. Never after the terminal batch.
        sleep(config.batch_delay()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConversationHandle;
    use crate::infrastructure::replay::SnapshotChat;
    use crate::infrastructure::ReplayTransport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast() -> PagerConfig {
        PagerConfig {
            batch_size: 2,
            batch_delay_ms: 0,
            chat_delay_ms: 0,
        }
    }

    fn msg(id: &str, ts: i64) -> RawMessage {
        RawMessage {
            id: id.into(),
            timestamp: ts,
            sender_id: "x@c.us".into(),
            author_id: None,
            body: Some("m".into()),
            has_media: false,
            is_from_self: false,
        }
    }

    fn transport(messages: Vec<RawMessage>) -> ReplayTransport {
        ReplayTransport::from_chats(vec![SnapshotChat {
            handle: ConversationHandle {
                id: "1@c.us".into(),
                name: None,
                is_group: false,
            },
            messages,
        }])
    }

    #[tokio::test]
    async fn test_stops_once_lower_bound_is_covered() {
        // Five messages; window starts at ts 300, so paging two at a time
        // should stop after the second page (oldest seen 200 <= 300).
        let t = transport(vec![
            msg("a", 100),
            msg("b", 200),
            msg("c", 300),
            msg("d", 400),
            msg("e", 500),
        ]);

        let history = collect_history(&t, "1@c.us", 300, &fast()).await;
        assert!(!history.truncated);
        let ids: Vec<&str> = history.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["e", "d", "c", "b"]);
    }

    #[tokio::test]
    async fn test_exhausts_history_on_empty_batch() {
        // Oldest message (ts 400) is still newer than the window start, so
        // the pager must run off the end of history and stop cleanly.
        let t = transport(vec![msg("a", 400), msg("b", 500)]);

        let history = collect_history(&t, "1@c.us", 100, &fast()).await;
        assert!(!history.truncated);
        assert_eq!(history.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_chat_yields_nothing() {
        let t = transport(Vec::new());
        let history = collect_history(&t, "1@c.us", 0, &fast()).await;
        assert!(history.messages.is_empty());
        assert!(!history.truncated);
    }

    /// Serves one good page then fails, to exercise the containment path.
    struct FlakyTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MessageTransport for FlakyTransport {
        async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationHandle>> {
            Ok(Vec::new())
        }

        async fn get_conversation_by_id(
            &self,
            _id: &str,
        ) -> anyhow::Result<Option<ConversationHandle>> {
            Ok(None)
        }

        async fn fetch_message_batch(
            &self,
            _chat_id: &str,
            _options: FetchOptions,
        ) -> anyhow::Result<Vec<RawMessage>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![msg("b", 500), msg("a", 400)])
            } else {
                anyhow::bail!("session dropped mid-scrape")
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_accumulated_messages() {
        let t = FlakyTransport {
            calls: AtomicUsize::new(0),
        };

        let history = collect_history(&t, "1@c.us", 100, &fast()).await;
        assert!(history.truncated);
        assert_eq!(history.messages.len(), 2);
    }
}
