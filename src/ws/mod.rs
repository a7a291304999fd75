pub mod chat;
pub mod handlers;
pub mod presence;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::broadcast::ConnectionFeed;
use crate::error::ChatError;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::state::AppState;
use crate::types::new_connection_id;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = new_connection_id();
    let mut feed = ConnectionFeed::new(connection_id.clone());
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("User connected: {}", connection_id);

    // Subscribe before handling any event so this connection sees the
    // broadcasts caused by its own join
    let mut hub_rx = state.subscribe();

    loop {
        tokio::select! {
            // Handle hub broadcasts
            hub_msg = hub_rx.recv() => {
                match hub_msg {
                    Ok(envelope) => {
                        if let Some(event) = feed.accept(&envelope) {
                            if send_event(&mut sender, event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Connection {} lagged behind, skipped {} events",
                            connection_id,
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message from {}: {}", connection_id, text);

                        let event = match parse_client_event(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                tracing::warn!("Dropping frame from {}: {}", connection_id, e);
                                continue;
                            }
                        };

                        let replies = handlers::handle_event(&connection_id, event, &state).await;
                        let mut failed = false;
                        for reply in &replies {
                            feed.record_reply(reply);
                            if send_event(&mut sender, reply).await.is_err() {
                                tracing::error!("Failed to send response");
                                failed = true;
                                break;
                            }
                        }
                        if failed {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    handlers::handle_event(&connection_id, ClientEvent::Disconnect, &state).await;
    tracing::info!("User disconnected: {}", connection_id);
}

/// Parse one text frame into a client event
pub fn parse_client_event(text: &str) -> Result<ClientEvent, ChatError> {
    Ok(serde_json::from_str(text)?)
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!("Failed to serialize {}: {}", event.name(), e);
            Ok(())
        }
    }
}
