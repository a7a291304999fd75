//! Chat event dispatch
//!
//! `handle_event` is the single entry point for everything a connection can
//! do. Replies meant only for the sender are returned; everything else goes
//! out on the hub channel. Events are handled one at a time across all
//! connections.

use crate::protocol::{ClientEvent, ServerEvent};
use crate::state::AppState;
use std::sync::Arc;

use super::{chat, presence};

/// Handle one client event and return the events for the sender only
pub async fn handle_event(
    connection_id: &str,
    event: ClientEvent,
    state: &Arc<AppState>,
) -> Vec<ServerEvent> {
    let _dispatch = state.dispatch.lock().await;

    match event {
        ClientEvent::UserJoin(raw_name) => {
            presence::handle_join(state, connection_id, raw_name).await
        }

        ClientEvent::SendMessage { message } => {
            chat::handle_send_message(state, connection_id, message)
                .await
                .into_iter()
                .collect()
        }

        ClientEvent::TypingStart => {
            presence::handle_typing(state, connection_id, true).await;
            Vec::new()
        }

        ClientEvent::TypingStop => {
            presence::handle_typing(state, connection_id, false).await;
            Vec::new()
        }

        ClientEvent::Disconnect => {
            presence::handle_disconnect(state, connection_id).await;
            Vec::new()
        }
    }
}
