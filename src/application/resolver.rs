//! Conversation resolution.
//!
//! Turns a request scope into a concrete ordered set of chat handles,
//! normalizing single-chat identifiers the way the upstream expects them.

use crate::domain::{ConversationHandle, ExportError, Result, Scope};
use crate::infrastructure::MessageTransport;

/// Domain suffix appended to bare phone-number identifiers.
const INDIVIDUAL_SUFFIX: &str = "@c.us";

/// A resolved scope: the chats to process, in order, plus the normalized
/// id when the scope named a single chat.
#[derive(Debug)]
pub struct ResolvedScope {
    pub handles: Vec<ConversationHandle>,
    pub single_id: Option<String>,
}

/// Normalizes a raw chat identifier.
///
/// An id that already carries a domain part (`123@c.us`, `123456-789@g.us`)
/// only has formatting noise removed: ASCII alphanumerics, `@`, `.`, and `-`
/// survive, so normalization is idempotent on already-valid ids. A bare
/// input is treated as a phone number: everything but digits is stripped and
/// the individual-contact suffix is appended, so `+55 (11) 99999-9999`
/// becomes `5511999999999@c.us`.
///
/// # Errors
/// Returns `InvalidIdentifier` when nothing usable survives the stripping.
pub fn normalize_chat_id(raw: &str) -> Result<String> {
    let mut cleaned: String = if raw.contains('@') {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-'))
            .collect()
    } else {
        raw.chars().filter(char::is_ascii_digit).collect()
    };

    if cleaned.is_empty() || cleaned.starts_with('@') {
        return Err(ExportError::InvalidIdentifier {
            input: raw.to_string(),
        });
    }

    if !cleaned.contains('@') {
        cleaned.push_str(INDIVIDUAL_SUFFIX);
        tracing::debug!(id = %cleaned, "chat id normalized with default suffix");
    }

    Ok(cleaned)
}

/// Whether a listed chat is an ephemeral pseudo-chat (status broadcast feed)
/// that never belongs in an export.
fn is_pseudo_chat(handle: &ConversationHandle) -> bool {
    handle.id.ends_with("@broadcast")
}

/// Resolves a request scope into chat handles, preserving transport order.
///
/// # Errors
/// - `InvalidIdentifier` if a single-chat id normalizes to nothing.
/// - `ConversationNotFound` if the by-id lookup returns nothing; the message
///   carries the *normalized* id.
/// - `ResolutionFailed` wrapping any transport error.
pub async fn resolve_scope(
    transport: &dyn MessageTransport,
    scope: &Scope,
) -> Result<ResolvedScope> {
    match scope {
        Scope::AllChats => {
            let handles = transport
                .list_conversations()
                .await
                .map_err(ExportError::resolution)?;

            let handles: Vec<ConversationHandle> =
                handles.into_iter().filter(|h| !is_pseudo_chat(h)).collect();

            tracing::debug!(chats = handles.len(), "resolved all-chats scope");
            Ok(ResolvedScope {
                handles,
                single_id: None,
            })
        }
        Scope::SingleChat(raw) => {
            let id = normalize_chat_id(raw)?;

            let handle = transport
                .get_conversation_by_id(&id)
                .await
                .map_err(ExportError::resolution)?
                .ok_or_else(|| ExportError::ConversationNotFound { id: id.clone() })?;

            Ok(ResolvedScope {
                handles: vec![handle],
                single_id: Some(id),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::replay::SnapshotChat;
    use crate::infrastructure::ReplayTransport;

    fn handle(id: &str) -> ConversationHandle {
        ConversationHandle {
            id: id.into(),
            name: None,
            is_group: false,
        }
    }

    fn transport_with(ids: &[&str]) -> ReplayTransport {
        ReplayTransport::from_chats(
            ids.iter()
                .map(|id| SnapshotChat {
                    handle: handle(id),
                    messages: Vec::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_bare_number_gets_individual_suffix() {
        assert_eq!(
            normalize_chat_id("551199999999").unwrap(),
            "551199999999@c.us"
        );
    }

    #[test]
    fn test_formatting_characters_are_stripped() {
        assert_eq!(
            normalize_chat_id("+55 (11) 99999-9999").unwrap(),
            "5511999999999@c.us"
        );
    }

    #[test]
    fn test_existing_suffix_is_kept() {
        assert_eq!(
            normalize_chat_id("551199999999@c.us").unwrap(),
            "551199999999@c.us"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        // Ids the `chats` listing prints must round-trip unchanged.
        for id in ["551199999999@c.us", "123456-789@g.us", "status@broadcast"] {
            let once = normalize_chat_id(id).unwrap();
            assert_eq!(once, id);
            assert_eq!(normalize_chat_id(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_group_id_hyphen_survives() {
        assert_eq!(
            normalize_chat_id("123456-789@g.us").unwrap(),
            "123456-789@g.us"
        );
    }

    #[test]
    fn test_suffixed_id_with_noise_is_cleaned() {
        assert_eq!(
            normalize_chat_id(" 551199999999@c.us\n").unwrap(),
            "551199999999@c.us"
        );
    }

    #[test]
    fn test_empty_local_part_is_invalid() {
        assert!(matches!(
            normalize_chat_id("+@c.us"),
            Err(ExportError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_empty_after_stripping_is_invalid() {
        assert!(matches!(
            normalize_chat_id("abc-def"),
            Err(ExportError::InvalidIdentifier { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_chats_excludes_broadcast_feed() {
        let transport = transport_with(&["123@c.us", "status@broadcast", "456@g.us"]);
        let resolved = resolve_scope(&transport, &Scope::AllChats).await.unwrap();
        let ids: Vec<&str> = resolved.handles.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["123@c.us", "456@g.us"]);
        assert!(resolved.single_id.is_none());
    }

    #[tokio::test]
    async fn test_missing_chat_reports_normalized_id() {
        let transport = transport_with(&["123@c.us"]);
        let err = resolve_scope(&transport, &Scope::SingleChat("551199999999".into()))
            .await
            .unwrap_err();
        match err {
            ExportError::ConversationNotFound { id } => {
                assert_eq!(id, "551199999999@c.us");
            }
            other => panic!("expected ConversationNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_chat_resolves() {
        let transport = transport_with(&["5511999999999@c.us"]);
        let resolved = resolve_scope(&transport, &Scope::SingleChat("55 11 99999-9999".into()))
            .await
            .unwrap();
        assert_eq!(resolved.handles.len(), 1);
        assert_eq!(resolved.single_id.as_deref(), Some("5511999999999@c.us"));
    }
}
