//! Room catalog endpoint. Rooms are configuration, not stored entities;
//! membership is derived live from the connection registry.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RoomsResponse {
    pub rooms: Vec<String>,
}

/// GET /api/rooms — the configured room name catalog.
pub async fn list_rooms(State(state): State<AppState>) -> Json<RoomsResponse> {
    Json(RoomsResponse {
        rooms: state.rooms.as_ref().clone(),
    })
}
