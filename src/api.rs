//! Read-only HTTP endpoints.
//!
//! Handy for checking on the server without opening a socket.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::ChatMessage;

/// Response for `GET /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUsersResponse {
    pub count: usize,
    pub users: Vec<String>,
}

/// Current message history, oldest first.
///
/// GET /api/messages
pub async fn list_messages(State(state): State<Arc<AppState>>) -> Json<Vec<ChatMessage>> {
    Json(state.history.read().await.snapshot())
}

/// Display names of everyone currently joined.
///
/// GET /api/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<OnlineUsersResponse> {
    let users = state.presence.read().await.list_all();
    Json(OnlineUsersResponse {
        count: users.len(),
        users,
    })
}
