//! Susceptibility report routes.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use tracing::instrument;
use uuid::Uuid;

use pretexta_simulation::application::reports::{self, SusceptibilityReport};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/reports/{id}/json
#[instrument(skip(state), fields(run_id = %id))]
async fn report_json(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<SusceptibilityReport>, ApiError> {
    let report =
        reports::build_report(id, state.clock.as_ref(), &*state.event_repository).await?;
    Ok(Json(report))
}

/// Returns the reports router.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/json", get(report_json))
}
