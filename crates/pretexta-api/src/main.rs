//! Pretexta API server entry point.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pretexta_api::auth::{Credentials, SessionStore};
use pretexta_api::error::AppError;
use pretexta_api::routes;
use pretexta_api::settings::SettingsStore;
use pretexta_api::state::AppState;
use pretexta_content::store::InMemoryContentStore;
use pretexta_core::clock::SystemClock;
use pretexta_event_store::PgEventRepository;
use pretexta_event_store::schema::CREATE_EVENTS_TABLE;
use pretexta_llm::client::OpenAiCompatClient;
use pretexta_llm::config::LlmConfigStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Pretexta API server");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
    let content_dir = std::env::var("CONTENT_DIR").unwrap_or_else(|_| "content".to_string());
    let username = std::env::var("PRETEXTA_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("PRETEXTA_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("PRETEXTA_PASSWORD not set, using the default password");
        "pretexta".to_string()
    });

    // Create database connection pool and ensure the event store schema.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    sqlx::raw_sql(CREATE_EVENTS_TABLE).execute(&pool).await?;

    // Load authored content.
    let content = InMemoryContentStore::new();
    content.load_dir(Path::new(&content_dir))?;

    let llm_client = OpenAiCompatClient::new()
        .map_err(|e| AppError::Config(format!("LLM client initialization failed: {e}")))?;

    // Build application state.
    let app_state = AppState {
        clock: Arc::new(SystemClock),
        event_repository: Arc::new(PgEventRepository::new(pool)),
        content: Arc::new(content),
        llm_config: Arc::new(LlmConfigStore::new()),
        llm_client: Arc::new(llm_client),
        settings: Arc::new(SettingsStore::new()),
        sessions: Arc::new(SessionStore::new()),
        credentials: Arc::new(Credentials::new(&username, &password)),
    };

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
