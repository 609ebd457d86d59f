//! Login and session routes.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The logged-in user.
    pub username: String,
}

/// Response body for GET /me.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The user the presented token belongs to.
    pub username: String,
}

/// POST /api/auth/login
#[instrument(skip(state, request))]
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.credentials.verify(&request.username, &request.password) {
        warn!(username = %request.username, "rejected login attempt");
        return Err(ApiError::Unauthorized(
            "invalid username or password".to_owned(),
        ));
    }

    let token = state.sessions.issue(&request.username);
    info!(username = %request.username, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        username: request.username,
    }))
}

/// GET /api/auth/me
async fn me(auth: Authenticated) -> Json<MeResponse> {
    Json(MeResponse {
        username: auth.username,
    })
}

/// Returns the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}
