//! API route modules.

pub mod auth;
pub mod challenges;
pub mod health;
pub mod import;
pub mod llm;
pub mod quizzes;
pub mod reports;
pub mod settings;
pub mod simulations;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/settings", settings::router())
        .nest("/api/challenges", challenges::router())
        .nest("/api/quizzes", quizzes::router())
        .nest("/api/simulations", simulations::router())
        .nest("/api/llm", llm::router())
        .nest("/api/reports", reports::router())
        .nest("/api/import", import::router())
        .with_state(state)
}
