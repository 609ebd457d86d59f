//! Canned LLM client — deterministic `LlmClient` implementation for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use pretexta_llm::client::{ChatMessage, LlmClient};
use pretexta_llm::config::ProviderConfig;
use pretexta_llm::error::LlmError;

/// An LLM client that replays a fixed list of replies and records every
/// system message and prompt it was handed.
#[derive(Debug)]
pub struct CannedLlmClient {
    replies: Mutex<Vec<String>>,
    systems: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl CannedLlmClient {
    /// A client that returns the given replies in order. Once they run out,
    /// every call fails with [`LlmError::NotConfigured`].
    #[must_use]
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies),
            systems: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client that always returns `reply`.
    #[must_use]
    pub fn always(reply: &str) -> Self {
        Self::new(vec![reply.to_owned(); 64])
    }

    /// The system messages handed to the client, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn systems(&self) -> Vec<String> {
        self.systems.lock().unwrap().clone()
    }

    /// The prompts and user messages handed to the client, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.systems.lock().unwrap().push(system.to_owned());
        self.prompts.lock().unwrap().push(prompt.to_owned());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(LlmError::NotConfigured);
        }
        Ok(replies.remove(0))
    }
}

#[async_trait]
impl LlmClient for CannedLlmClient {
    async fn generate(
        &self,
        _config: &ProviderConfig,
        system: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        self.next_reply(system, prompt)
    }

    async fn chat(
        &self,
        _config: &ProviderConfig,
        system: &str,
        _history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        self.next_reply(system, message)
    }
}
