pub mod history;
pub mod presence;

use crate::broadcast::{Envelope, HUB_CAPACITY};
use crate::protocol::ServerEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

pub use history::{MessageStore, StoreError};
pub use presence::PresenceTable;

/// Shared application state
///
/// Event handlers run one at a time under `dispatch`, so every event is
/// handled to completion before the next one for any connection starts.
#[derive(Clone)]
pub struct AppState {
    /// Held for the whole of each event handler
    pub dispatch: Arc<Mutex<()>>,
    pub presence: Arc<RwLock<PresenceTable>>,
    pub history: Arc<RwLock<MessageStore>>,
    /// Hub channel every connection subscribes to
    pub broadcast: broadcast::Sender<Envelope>,
}

impl AppState {
    /// Create state with an empty history persisted to `messages_file`
    pub fn new(messages_file: impl Into<PathBuf>) -> Self {
        Self::with_store(MessageStore::new(messages_file))
    }

    /// Create state seeded from whatever is already in `messages_file`
    pub async fn load(messages_file: impl Into<PathBuf>) -> Self {
        Self::with_store(MessageStore::load_on_startup(messages_file).await)
    }

    pub fn with_store(store: MessageStore) -> Self {
        let (tx, _rx) = broadcast::channel(HUB_CAPACITY);
        Self {
            dispatch: Arc::new(Mutex::new(())),
            presence: Arc::new(RwLock::new(PresenceTable::new())),
            history: Arc::new(RwLock::new(store)),
            broadcast: tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.broadcast.subscribe()
    }

    /// Publish an event to every connection
    pub fn broadcast_all(&self, event: ServerEvent) {
        self.publish(Envelope::to_all(event));
    }

    /// Publish an event to every connection except `sender`
    pub fn broadcast_others(&self, sender: &str, event: ServerEvent) {
        self.publish(Envelope::to_others(sender, event));
    }

    fn publish(&self, envelope: Envelope) {
        tracing::debug!(
            "Broadcasting {} to {:?}",
            envelope.event.name(),
            envelope.audience
        );
        // Ignore send errors (no receivers connected is fine)
        let _ = self.broadcast.send(envelope);
    }

    /// Broadcast the full list of online users. Callers pass the table they
    /// just mutated, still locked, so the list matches that mutation.
    pub fn broadcast_online_users(&self, presence: &PresenceTable) {
        self.broadcast_all(ServerEvent::OnlineUsers(presence.list_all()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Audience;

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("messages.json"));
        state.broadcast_all(ServerEvent::OnlineUsers(vec![]));
    }

    #[tokio::test]
    async fn test_broadcast_online_users() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("messages.json"));
        let mut rx = state.subscribe();

        let mut presence = state.presence.write().await;
        presence.join("c1", "Alice").unwrap();
        state.broadcast_online_users(&presence);
        drop(presence);

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.audience, Audience::All);
        assert_eq!(
            envelope.event,
            ServerEvent::OnlineUsers(vec!["Alice".to_string()])
        );
    }

    #[tokio::test]
    async fn test_load_reads_existing_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        tokio::fs::write(
            &path,
            r#"[{"id":"1","username":"Bob","message":"hi","timestamp":"2024-05-06T12:00:00.000Z"}]"#,
        )
        .await
        .unwrap();

        let state = AppState::load(&path).await;
        let history = state.history.read().await.snapshot();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].username, "Bob");
    }
}
