//! Settings routes.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use tracing::instrument;

use crate::auth::Authenticated;
use crate::settings::{Settings, SettingsUpdate};
use crate::state::AppState;

/// GET /api/settings
async fn get_settings(State(state): State<AppState>, _auth: Authenticated) -> Json<Settings> {
    Json(state.settings.get())
}

/// PUT /api/settings
#[instrument(skip(state, update))]
async fn put_settings(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(update): Json<SettingsUpdate>,
) -> Json<Settings> {
    Json(state.settings.apply(update))
}

/// Returns the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(put_settings))
}
