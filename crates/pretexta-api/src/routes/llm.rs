//! LLM proxy routes.
//!
//! Keys never leave the server: config listings are masked, and generation
//! and chat calls resolve the stored config by provider name.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use pretexta_content::scenario::Channel;
use pretexta_core::clock::Clock;
use pretexta_core::error::DomainError;
use pretexta_llm::adaptive::{self, AdaptiveContext, GeneratedMessage};
use pretexta_llm::chat::{self, ChatStatus};
use pretexta_llm::client::{ChatMessage, LlmClient};
use pretexta_llm::config::{ProviderConfig, SaveOutcome};
use pretexta_llm::error::LlmError;
use pretexta_llm::normalizer::{self, ChallengeKind, ChallengeSet};
use pretexta_llm::personas::{self, Persona};
use pretexta_llm::sanitize::repair_json;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

const GENERATOR_SYSTEM_PROMPT: &str =
    "You are a social engineering pretext generator for security awareness \
     training. Generate realistic, ethically-sound pretexts. Always mark \
     outputs as training material.";

/// Response body for POST /config.
#[derive(Debug, Serialize)]
pub struct SaveConfigResponse {
    /// `saved` or `revoked`.
    pub status: &'static str,
}

/// Request body for POST /generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Provider to use; defaults to the first enabled one.
    #[serde(default)]
    pub provider: Option<String>,
    /// Free-form prompt, for plain text generation.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Challenge format; switches the call into challenge generation.
    #[serde(default)]
    pub challenge_type: Option<ChallengeKind>,
    /// Attack category for challenge generation.
    #[serde(default)]
    pub category: Option<String>,
    /// Difficulty label for challenge generation.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Question count for challenge generation.
    #[serde(default)]
    pub num_questions: Option<u32>,
    /// Extra context folded into the system message.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// Response body for POST /generate.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Generated text, for free-form prompts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_text: Option<String>,
    /// Normalized challenge, for challenge generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<ChallengeSet>,
    /// Provider that served the call.
    pub provider: String,
}

/// Request body for POST /adaptive.
#[derive(Debug, Deserialize)]
pub struct AdaptiveRequest {
    /// Provider to use; defaults to the first enabled one.
    #[serde(default)]
    pub provider: Option<String>,
    /// Channel to render in when the generator names none.
    #[serde(default)]
    pub fallback_channel: Option<Channel>,
    /// Play context handed to the generator.
    #[serde(flatten)]
    pub context: AdaptiveContext,
}

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Attacker persona to roleplay.
    pub persona_id: String,
    /// Provider to use; defaults to the first enabled one.
    #[serde(default)]
    pub provider: Option<String>,
    /// Prior turns of the conversation.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// The participant's new message.
    pub message: String,
}

/// Response body for POST /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Always `assistant`.
    pub role: &'static str,
    /// The attacker's reply, markers removed.
    pub content: String,
    /// Session status derived from the markers.
    pub status: ChatStatus,
}

fn resolve_config(state: &AppState, provider: Option<&str>) -> Result<ProviderConfig, ApiError> {
    let config = match provider {
        Some(name) => state.llm_config.get_enabled(name),
        None => state.llm_config.first_enabled(),
    };
    config.ok_or(ApiError::Llm(LlmError::NotConfigured))
}

/// GET /api/llm/config
async fn list_config(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Json<Vec<ProviderConfig>> {
    Json(state.llm_config.list_masked())
}

/// POST /api/llm/config
#[instrument(skip(state, config), fields(provider = %config.provider))]
async fn save_config(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(config): Json<ProviderConfig>,
) -> Json<SaveConfigResponse> {
    let outcome = state.llm_config.save(config, state.clock.now());
    let status = match outcome {
        SaveOutcome::Saved => "saved",
        SaveOutcome::Revoked => "revoked",
    };
    info!(status, "provider config updated");
    Json(SaveConfigResponse { status })
}

/// GET /api/llm/personas
async fn list_personas(_auth: Authenticated) -> Json<Vec<Persona>> {
    Json(personas::catalog())
}

/// POST /api/llm/generate
#[instrument(skip(state, request), fields(provider = ?request.provider))]
async fn generate(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let config = resolve_config(&state, request.provider.as_deref())?;
    let system = request.context.as_ref().map_or_else(
        || GENERATOR_SYSTEM_PROMPT.to_owned(),
        |context| format!("{GENERATOR_SYSTEM_PROMPT}\n\nContext: {context}"),
    );

    if let Some(kind) = request.challenge_type {
        let prompt = normalizer::generation_prompt(
            kind,
            request.category.as_deref().unwrap_or("general"),
            request.difficulty.as_deref().unwrap_or("medium"),
            request.num_questions.unwrap_or(5),
        );
        let raw = state.llm_client.generate(&config, &system, &prompt).await?;
        let challenge = normalizer::normalize(&raw, kind)
            .map_err(|e| ApiError::Llm(LlmError::InvalidResponse(e.to_string())))?;
        info!(questions = challenge.questions.len(), "challenge generated");
        return Ok(Json(GenerateResponse {
            generated_text: None,
            challenge: Some(challenge),
            provider: config.provider,
        }));
    }

    let prompt = request.prompt.ok_or_else(|| {
        ApiError::Domain(DomainError::Validation(
            "either `prompt` or `challenge_type` is required".to_owned(),
        ))
    })?;
    let raw = state.llm_client.generate(&config, &system, &prompt).await?;
    Ok(Json(GenerateResponse {
        generated_text: Some(repair_json(&raw)),
        challenge: None,
        provider: config.provider,
    }))
}

/// POST /api/llm/adaptive
#[instrument(skip(state, request), fields(node = %request.context.current_node))]
async fn adaptive_handler(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(request): Json<AdaptiveRequest>,
) -> Result<Json<GeneratedMessage>, ApiError> {
    let config = resolve_config(&state, request.provider.as_deref())?;
    let generated = adaptive::generate(
        state.llm_client.as_ref(),
        &config,
        &request.context,
        request.fallback_channel.unwrap_or(Channel::EmailInbox),
    )
    .await?;
    Ok(Json(generated))
}

/// POST /api/llm/chat
#[instrument(skip(state, request), fields(persona_id = %request.persona_id))]
async fn chat_handler(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let config = resolve_config(&state, request.provider.as_deref())?;
    let persona = personas::find(&request.persona_id).ok_or_else(|| {
        ApiError::Domain(DomainError::Validation(format!(
            "unknown persona `{}`",
            request.persona_id
        )))
    })?;

    let reply = chat::chat_turn(
        state.llm_client.as_ref(),
        &config,
        &persona,
        &request.history,
        &request.message,
    )
    .await?;

    Ok(Json(ChatResponse {
        role: "assistant",
        content: reply.content,
        status: reply.status,
    }))
}

/// Returns the LLM proxy router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(list_config).post(save_config))
        .route("/personas", get(list_personas))
        .route("/generate", post(generate))
        .route("/adaptive", post(adaptive_handler))
        .route("/chat", post(chat_handler))
}
