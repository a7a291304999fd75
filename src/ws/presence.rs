//! Join, typing and disconnect handlers

use crate::protocol::ServerEvent;
use crate::state::AppState;
use crate::types::{PresenceNotice, TypingNotice};
use std::sync::Arc;

pub async fn handle_join(
    state: &Arc<AppState>,
    connection_id: &str,
    raw_name: String,
) -> Vec<ServerEvent> {
    let mut presence = state.presence.write().await;

    let username = match presence.join(connection_id, &raw_name) {
        Ok(name) => name,
        Err(e) => {
            tracing::info!("Join rejected for {}: {}", connection_id, e);
            return vec![ServerEvent::JoinError(e.to_string())];
        }
    };

    let history = state.history.read().await.snapshot();

    state.broadcast_others(
        connection_id,
        ServerEvent::UserConnected(PresenceNotice::now(username.clone())),
    );
    state.broadcast_online_users(&presence);
    drop(presence);

    tracing::info!("{} joined the chat", username);
    vec![ServerEvent::LoadHistory(history)]
}

pub async fn handle_typing(state: &Arc<AppState>, connection_id: &str, typing: bool) {
    let Some(username) = state.presence.read().await.lookup(connection_id) else {
        tracing::debug!("Ignoring typing event from unjoined connection {}", connection_id);
        return;
    };

    let notice = TypingNotice { username };
    let event = if typing {
        ServerEvent::UserTyping(notice)
    } else {
        ServerEvent::UserStopTyping(notice)
    };
    state.broadcast_others(connection_id, event);
}

pub async fn handle_disconnect(state: &Arc<AppState>, connection_id: &str) {
    let mut presence = state.presence.write().await;

    if let Some(username) = presence.leave(connection_id) {
        state.broadcast_others(
            connection_id,
            ServerEvent::UserDisconnected(PresenceNotice::now(username.clone())),
        );
        state.broadcast_online_users(&presence);
        drop(presence);

        tracing::info!("{} left the chat", username);
    }
}
