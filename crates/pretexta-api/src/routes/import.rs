//! Content import routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use pretexta_content::import::{ImportedContent, import_yaml};
use pretexta_content::store::ContentStore;
use pretexta_core::error::DomainError;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for a successful import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// `scenario` or `quiz`.
    pub imported: &'static str,
    /// Id of the imported document.
    pub id: Uuid,
}

/// POST /api/import/yaml
///
/// The body is the raw YAML document, not JSON.
#[instrument(skip(state, body))]
async fn import_yaml_handler(
    State(state): State<AppState>,
    _auth: Authenticated,
    body: String,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let imported =
        import_yaml(&body).map_err(|e| DomainError::Validation(e.to_string()))?;

    let response = match imported {
        ImportedContent::Scenario(scenario) => {
            let id = scenario.id;
            state.content.insert_scenario(*scenario).await;
            ImportResponse {
                imported: "scenario",
                id,
            }
        }
        ImportedContent::Quiz(quiz) => {
            let id = quiz.id;
            state.content.insert_quiz(*quiz).await;
            ImportResponse {
                imported: "quiz",
                id,
            }
        }
    };
    info!(kind = response.imported, id = %response.id, "content imported");

    Ok((StatusCode::CREATED, Json(response)))
}

/// Returns the import router.
pub fn router() -> Router<AppState> {
    Router::new().route("/yaml", post(import_yaml_handler))
}
