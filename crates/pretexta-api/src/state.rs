//! Shared application state.

use std::sync::Arc;

use pretexta_content::store::ContentStore;
use pretexta_core::clock::Clock;
use pretexta_core::repository::EventRepository;
use pretexta_llm::client::LlmClient;
use pretexta_llm::config::LlmConfigStore;

use crate::auth::{Credentials, SessionStore};
use crate::settings::SettingsStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Event store for simulation runs.
    pub event_repository: Arc<dyn EventRepository>,
    /// Scenario and quiz catalog.
    pub content: Arc<dyn ContentStore>,
    /// LLM provider configurations.
    pub llm_config: Arc<LlmConfigStore>,
    /// Outbound LLM client.
    pub llm_client: Arc<dyn LlmClient>,
    /// User settings.
    pub settings: Arc<SettingsStore>,
    /// Active bearer tokens.
    pub sessions: Arc<SessionStore>,
    /// Seeded login credentials.
    pub credentials: Arc<Credentials>,
}
