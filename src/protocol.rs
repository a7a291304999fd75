use crate::types::*;
use serde::{Deserialize, Serialize};

/// Events sent by a browser. Each WebSocket text frame holds one event as
/// `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Raw, unsanitized username
    UserJoin(String),
    SendMessage {
        message: String,
    },
    TypingStart,
    TypingStop,
    /// Never sent on the wire; dispatched when the socket goes away
    #[serde(skip)]
    Disconnect,
}

/// Events sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full history snapshot, sent once to a connection after it joins
    LoadHistory(Vec<ChatMessage>),
    ReceiveMessage(ChatMessage),
    UserConnected(PresenceNotice),
    UserDisconnected(PresenceNotice),
    /// Every display name currently online (full resync, not a delta)
    OnlineUsers(Vec<String>),
    UserTyping(TypingNotice),
    UserStopTyping(TypingNotice),
    JoinError(String),
    MessageError(String),
}

impl ServerEvent {
    /// Wire name of this event, for logging
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::LoadHistory(_) => "load_history",
            ServerEvent::ReceiveMessage(_) => "receive_message",
            ServerEvent::UserConnected(_) => "user_connected",
            ServerEvent::UserDisconnected(_) => "user_disconnected",
            ServerEvent::OnlineUsers(_) => "online_users",
            ServerEvent::UserTyping(_) => "user_typing",
            ServerEvent::UserStopTyping(_) => "user_stop_typing",
            ServerEvent::JoinError(_) => "join_error",
            ServerEvent::MessageError(_) => "message_error",
        }
    }
}
