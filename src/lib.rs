// Public API for integration tests and potential library usage

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod types;
pub mod ws;

use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Build the HTTP router: WebSocket endpoint, read-only API and the static
/// browser client
pub fn app(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/messages", get(api::list_messages))
        .route("/api/users", get(api::list_users))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
