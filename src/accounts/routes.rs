//! REST endpoints for account registration and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::store::{self, CreateError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub identity: String,
}

/// POST /api/auth/register — create a new identity.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<IdentityResponse>), StatusCode> {
    let db = state.db.clone();
    let username = body.username.clone();

    let identity = tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        match store::create(&conn, &username, &body.password) {
            Ok(()) => Ok(username.trim().to_string()),
            Err(CreateError::Taken) => Err(StatusCode::CONFLICT),
            Err(CreateError::Invalid) => Err(StatusCode::BAD_REQUEST),
            Err(CreateError::Internal) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        }
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)??;

    tracing::info!(identity = %identity, "Account created");
    Ok((StatusCode::CREATED, Json(IdentityResponse { identity })))
}

/// POST /api/auth/login — verify credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<IdentityResponse>, StatusCode> {
    let db = state.db.clone();

    let identity = tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        store::verify(&conn, &body.username, &body.password).ok_or(StatusCode::UNAUTHORIZED)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)??;

    Ok(Json(IdentityResponse { identity }))
}
