//! Outbound LLM client.
//!
//! One trait, one reqwest-backed implementation that talks to any
//! OpenAI-compatible chat-completions endpoint. Each call resolves the
//! provider config at request time so key rotation takes effect immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::LlmError;

/// Outbound requests are cut off after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The participant.
    User,
    /// The model (in roleplay, the attacker).
    Assistant,
}

/// One turn of a chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// A language-model client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-shot generation: a system context plus one user prompt.
    async fn generate(
        &self,
        config: &ProviderConfig,
        system: &str,
        prompt: &str,
    ) -> Result<String, LlmError>;

    /// Multi-turn chat: system prompt, prior turns, and the new user message.
    async fn chat(
        &self,
        config: &ProviderConfig,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiCompatClient {
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Builds the client with the request timeout applied.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Request`] when the TLS backend fails to initialize.
    pub fn new() -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn complete(
        &self,
        config: &ProviderConfig,
        messages: Vec<serde_json::Value>,
    ) -> Result<String, LlmError> {
        let url = endpoint(config);
        let model = model_for(config);
        debug!(provider = %config.provider, %model, "sending chat completion");

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing choices[0].message.content".to_owned())
            })
    }
}

fn endpoint(config: &ProviderConfig) -> String {
    let base = config.api_url.as_deref().unwrap_or(match config.provider.as_str() {
        "groq" => "https://api.groq.com/openai/v1",
        "ollama" => "http://localhost:11434/v1",
        _ => "https://api.openai.com/v1",
    });
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

fn model_for(config: &ProviderConfig) -> String {
    config
        .model_name
        .clone()
        .unwrap_or_else(|| match config.provider.as_str() {
            "groq" => "llama-3.3-70b-versatile".to_owned(),
            "ollama" => "llama3.1".to_owned(),
            _ => "gpt-4o-mini".to_owned(),
        })
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn generate(
        &self,
        config: &ProviderConfig,
        system: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let messages = vec![
            serde_json::json!({ "role": "system", "content": system }),
            serde_json::json!({ "role": "user", "content": prompt }),
        ];
        self.complete(config, messages).await
    }

    async fn chat(
        &self,
        config: &ProviderConfig,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        let mut messages = vec![serde_json::json!({ "role": "system", "content": system })];
        for turn in history {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(serde_json::json!({ "role": role, "content": turn.content }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": message }));
        self.complete(config, messages).await
    }
}
