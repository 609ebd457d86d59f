//! Error types for the LLM proxy.

use thiserror::Error;

/// Failures talking to a language-model provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No provider is configured and enabled.
    #[error("LLM provider not configured or not enabled")]
    NotConfigured,

    /// The outbound request could not be sent or timed out.
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("LLM provider error ({status}): {body}")]
    Provider {
        /// HTTP status the provider returned.
        status: u16,
        /// Response body, for the operator.
        body: String,
    },

    /// The provider's response did not have the expected shape.
    #[error("unexpected LLM response: {0}")]
    InvalidResponse(String),
}
