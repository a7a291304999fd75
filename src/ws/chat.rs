use crate::error::ChatError;
use crate::protocol::ServerEvent;
use crate::state::AppState;
use crate::types::{sanitize, ChatMessage, MAX_MESSAGE_CHARS};
use std::sync::Arc;

/// Store and broadcast a message. Returns an error event for the sender if
/// the connection has not joined; blank messages are dropped silently.
pub async fn handle_send_message(
    state: &Arc<AppState>,
    connection_id: &str,
    body: String,
) -> Option<ServerEvent> {
    let Some(username) = state.presence.read().await.lookup(connection_id) else {
        tracing::info!("Message from unjoined connection {}", connection_id);
        return Some(ServerEvent::MessageError(ChatError::NotJoined.to_string()));
    };

    let text = sanitize(&body, MAX_MESSAGE_CHARS);
    if text.is_empty() {
        return None;
    }

    let message = ChatMessage::new(username, text);
    tracing::debug!("{} says: {}", message.username, message.message);

    // Hold the history lock until the broadcast is queued so broadcast
    // order matches history order
    let mut history = state.history.write().await;
    history.append(message.clone()).await;
    state.broadcast_all(ServerEvent::ReceiveMessage(message));

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Audience;

    async fn joined_state(name: &str) -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().join("messages.json")));
        state.presence.write().await.join("c1", name).unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_message_is_stored_and_sent_to_all() {
        let (_dir, state) = joined_state("Bob").await;
        let mut rx = state.subscribe();

        let reply = handle_send_message(&state, "c1", "  hi  ".to_string()).await;
        assert!(reply.is_none());

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.audience, Audience::All);
        match envelope.event {
            ServerEvent::ReceiveMessage(msg) => {
                assert_eq!(msg.username, "Bob");
                assert_eq!(msg.message, "hi");
                assert!(chrono::DateTime::parse_from_rfc3339(&msg.timestamp).is_ok());
            }
            other => panic!("Expected ReceiveMessage, got {:?}", other),
        }

        assert_eq!(state.history.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_message_is_dropped() {
        let (_dir, state) = joined_state("Bob").await;
        let mut rx = state.subscribe();

        let reply = handle_send_message(&state, "c1", " \n\t ".to_string()).await;

        assert!(reply.is_none());
        assert!(rx.try_recv().is_err());
        assert!(state.history.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_long_message_is_truncated() {
        let (_dir, state) = joined_state("Bob").await;

        handle_send_message(&state, "c1", "y".repeat(800)).await;

        let history = state.history.read().await.snapshot();
        assert_eq!(history[0].message.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[tokio::test]
    async fn test_message_is_persisted() {
        let (dir, state) = joined_state("Bob").await;

        handle_send_message(&state, "c1", "saved".to_string()).await;

        let data = tokio::fs::read_to_string(dir.path().join("messages.json"))
            .await
            .unwrap();
        let on_disk: Vec<ChatMessage> = serde_json::from_str(&data).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].message, "saved");
    }
}
