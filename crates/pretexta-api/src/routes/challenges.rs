//! Scenario catalog routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};
use uuid::Uuid;

use pretexta_content::graph::validate_scenario;
use pretexta_content::scenario::Scenario;
use pretexta_content::store::ContentStore;
use pretexta_core::error::DomainError;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/challenges
async fn list(State(state): State<AppState>, _auth: Authenticated) -> Json<Vec<Scenario>> {
    Json(state.content.list_scenarios().await)
}

/// GET /api/challenges/{id}
async fn get_by_id(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<Scenario>, ApiError> {
    let scenario = state
        .content
        .get_scenario(id)
        .await
        .ok_or(DomainError::AggregateNotFound(id))?;
    Ok(Json(scenario))
}

/// POST /api/challenges
#[instrument(skip(state, scenario), fields(scenario_id = %scenario.id))]
async fn create(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(scenario): Json<Scenario>,
) -> Result<(StatusCode, Json<Scenario>), ApiError> {
    validate_scenario(&scenario).map_err(|e| DomainError::Validation(e.to_string()))?;

    info!(scenario_id = %scenario.id, title = %scenario.title, "scenario created");
    state.content.insert_scenario(scenario.clone()).await;

    Ok((StatusCode::CREATED, Json(scenario)))
}

/// Returns the scenario catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id))
}
