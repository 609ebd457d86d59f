//! User settings store.
//!
//! Settings are per-deployment and held in memory; the UI persists its own
//! copy and syncs through `GET`/`PUT /api/settings`.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// The adjustable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Content language (`en` or `id`).
    pub language: String,
    /// UI theme name.
    pub theme: String,
    /// Whether the first-run tour is still pending.
    pub first_run: bool,
    /// Whether LLM-backed features are switched on.
    pub llm_enabled: bool,
    /// Accessibility flag to suppress animations.
    pub reduce_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_owned(),
            theme: "light".to_owned(),
            first_run: true,
            llm_enabled: false,
            reduce_motion: false,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    /// New content language.
    #[serde(default)]
    pub language: Option<String>,
    /// New UI theme.
    #[serde(default)]
    pub theme: Option<String>,
    /// New first-run flag.
    #[serde(default)]
    pub first_run: Option<bool>,
    /// New LLM feature flag.
    #[serde(default)]
    pub llm_enabled: Option<bool>,
    /// New reduce-motion flag.
    #[serde(default)]
    pub reduce_motion: Option<bool>,
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct SettingsStore {
    inner: RwLock<Settings>,
}

impl SettingsStore {
    /// Creates a store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current settings.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn get(&self) -> Settings {
        self.inner.read().unwrap().clone()
    }

    /// Merges an update into the current settings and returns the result.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn apply(&self, update: SettingsUpdate) -> Settings {
        let mut settings = self.inner.write().unwrap();
        if let Some(language) = update.language {
            settings.language = language;
        }
        if let Some(theme) = update.theme {
            settings.theme = theme;
        }
        if let Some(first_run) = update.first_run {
            settings.first_run = first_run;
        }
        if let Some(llm_enabled) = update.llm_enabled {
            settings.llm_enabled = llm_enabled;
        }
        if let Some(reduce_motion) = update.reduce_motion {
            settings.reduce_motion = reduce_motion;
        }
        settings.clone()
    }
}
