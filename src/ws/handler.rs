use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::hub::ConnectionId;
use crate::state::AppState;
use crate::ws::actor;

/// Connection handles are process-local and never reused within a run.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// GET /ws
/// WebSocket upgrade endpoint. The connection starts with no identity
/// or room; a `join` event binds both.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let conn = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    ws.on_upgrade(move |socket| handle_upgraded(socket, state, conn))
}

async fn handle_upgraded(socket: WebSocket, state: AppState, conn: ConnectionId) {
    actor::run_connection(socket, state, conn).await;
}
