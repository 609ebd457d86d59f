//! Quiz catalog routes.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use uuid::Uuid;

use pretexta_content::quiz::Quiz;
use pretexta_content::store::ContentStore;
use pretexta_core::error::DomainError;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/quizzes
async fn list(State(state): State<AppState>, _auth: Authenticated) -> Json<Vec<Quiz>> {
    Json(state.content.list_quizzes().await)
}

/// GET /api/quizzes/{id}
async fn get_by_id(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<Quiz>, ApiError> {
    let quiz = state
        .content
        .get_quiz(id)
        .await
        .ok_or(DomainError::AggregateNotFound(id))?;
    Ok(Json(quiz))
}

/// Returns the quiz catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_by_id))
}
