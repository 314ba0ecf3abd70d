//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /cable` — Upgrade HTTP connection to the pub/sub cable.
pub async fn cable_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = state.channel_hub.clone();
    let ping_interval = state.cable_ping_interval;

    ws.on_upgrade(move |socket| run_connection(socket, hub, ping_interval))
}
