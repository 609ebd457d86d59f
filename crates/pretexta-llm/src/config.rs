//! Provider configuration store.
//!
//! Listing masks API keys as `***` and hides providers without a key; saving
//! a config with an empty key revokes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// The placeholder shown in place of a stored API key.
pub const MASKED_KEY: &str = "***";

/// One provider's configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider identifier (`openai`, `groq`, `ollama`, ...).
    pub provider: String,
    /// API key; masked on the way out.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Model override; providers carry a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Whether this provider may be used.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Requests per minute the operator wants to allow.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    /// Last save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

fn default_rate_limit() -> u32 {
    60
}

impl ProviderConfig {
    /// A copy with the API key replaced by [`MASKED_KEY`].
    #[must_use]
    pub fn masked(&self) -> Self {
        Self {
            api_key: MASKED_KEY.to_owned(),
            ..self.clone()
        }
    }
}

/// Outcome of saving a provider config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The config was stored.
    Saved,
    /// The key was empty, so the provider config was removed.
    Revoked,
}

/// In-memory store of provider configs, keyed by provider name.
#[derive(Debug, Default)]
pub struct LlmConfigStore {
    configs: RwLock<HashMap<String, ProviderConfig>>,
}

impl LlmConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a config, or revokes the provider when the key is empty.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn save(&self, mut config: ProviderConfig, now: DateTime<Utc>) -> SaveOutcome {
        let mut configs = self.configs.write().unwrap();
        if config.api_key.is_empty() {
            configs.remove(&config.provider);
            return SaveOutcome::Revoked;
        }
        config.updated_at = Some(now);
        configs.insert(config.provider.clone(), config);
        SaveOutcome::Saved
    }

    /// Lists configured providers with masked keys, skipping entries without
    /// a key. Sorted by provider name for a stable listing.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn list_masked(&self) -> Vec<ProviderConfig> {
        let configs = self.configs.read().unwrap();
        let mut masked: Vec<ProviderConfig> = configs
            .values()
            .filter(|c| !c.api_key.is_empty())
            .map(ProviderConfig::masked)
            .collect();
        masked.sort_by(|a, b| a.provider.cmp(&b.provider));
        masked
    }

    /// The named provider's config with the real key, if enabled.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn get_enabled(&self, provider: &str) -> Option<ProviderConfig> {
        let configs = self.configs.read().unwrap();
        configs.get(provider).filter(|c| c.enabled).cloned()
    }

    /// Any enabled provider's config with the real key. Providers are tried
    /// in name order so the pick is deterministic.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn first_enabled(&self) -> Option<ProviderConfig> {
        let configs = self.configs.read().unwrap();
        let mut enabled: Vec<&ProviderConfig> = configs.values().filter(|c| c.enabled).collect();
        enabled.sort_by(|a, b| a.provider.cmp(&b.provider));
        enabled.first().map(|c| (*c).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config(provider: &str, key: &str) -> ProviderConfig {
        ProviderConfig {
            provider: provider.to_owned(),
            api_key: key.to_owned(),
            api_url: None,
            model_name: None,
            enabled: true,
            rate_limit: 60,
            updated_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_listing_masks_keys() {
        let store = LlmConfigStore::new();
        store.save(config("groq", "sk-secret"), now());

        let listed = store.list_masked();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].api_key, MASKED_KEY);
        assert_eq!(listed[0].updated_at, Some(now()));
    }

    #[test]
    fn test_saving_empty_key_revokes_provider() {
        let store = LlmConfigStore::new();
        store.save(config("groq", "sk-secret"), now());

        let outcome = store.save(config("groq", ""), now());

        assert_eq!(outcome, SaveOutcome::Revoked);
        assert!(store.list_masked().is_empty());
        assert!(store.get_enabled("groq").is_none());
    }

    #[test]
    fn test_get_enabled_returns_real_key() {
        let store = LlmConfigStore::new();
        store.save(config("groq", "sk-secret"), now());

        let fetched = store.get_enabled("groq").unwrap();
        assert_eq!(fetched.api_key, "sk-secret");
    }

    #[test]
    fn test_disabled_provider_is_not_selectable() {
        let store = LlmConfigStore::new();
        let mut disabled = config("groq", "sk-secret");
        disabled.enabled = false;
        store.save(disabled, now());

        assert!(store.get_enabled("groq").is_none());
        assert!(store.first_enabled().is_none());
    }

    #[test]
    fn test_first_enabled_is_deterministic() {
        let store = LlmConfigStore::new();
        store.save(config("openai", "sk-b"), now());
        store.save(config("groq", "sk-a"), now());

        assert_eq!(store.first_enabled().unwrap().provider, "groq");
    }
}
