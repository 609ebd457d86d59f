//! Content store.
//!
//! Content is loaded once at startup (YAML files or API import) and served
//! read-mostly; scenarios are immutable during play.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::import::{ImportError, ImportedContent, import_yaml};
use crate::quiz::Quiz;
use crate::scenario::Scenario;

/// Read/write access to authored content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All scenarios, in insertion order.
    async fn list_scenarios(&self) -> Vec<Scenario>;

    /// One scenario by id.
    async fn get_scenario(&self, id: Uuid) -> Option<Scenario>;

    /// Adds a scenario (already graph-validated).
    async fn insert_scenario(&self, scenario: Scenario);

    /// All quizzes, in insertion order.
    async fn list_quizzes(&self) -> Vec<Quiz>;

    /// One quiz by id.
    async fn get_quiz(&self, id: Uuid) -> Option<Quiz>;

    /// Adds a quiz.
    async fn insert_quiz(&self, quiz: Quiz);
}

/// In-memory content store.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    scenario_order: Vec<Uuid>,
    scenarios: HashMap<Uuid, Scenario>,
    quiz_order: Vec<Uuid>,
    quizzes: HashMap<Uuid, Quiz>,
}

impl InMemoryContentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.yaml`/`*.yml` file in `dir` (non-recursive). Files that
    /// fail to import are skipped with a warning; a missing directory loads
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory exists but cannot be read.
    pub fn load_dir(&self, dir: &Path) -> Result<usize, std::io::Error> {
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "content directory missing, starting empty");
            return Ok(0);
        }
        let mut imported = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if !is_yaml {
                continue;
            }
            let source = std::fs::read_to_string(&path)?;
            match self.import(&source) {
                Ok(_) => imported += 1,
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "skipping content file");
                }
            }
        }
        tracing::info!(count = imported, dir = %dir.display(), "content loaded");
        Ok(imported)
    }

    /// Imports one YAML document into the store.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] when the document cannot be imported.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn import(&self, source: &str) -> Result<ImportedContent, ImportError> {
        let imported = import_yaml(source)?;
        let mut inner = self.inner.write().unwrap();
        // Re-imports replace in place instead of duplicating the listing.
        match &imported {
            ImportedContent::Scenario(s) => {
                if inner.scenarios.insert(s.id, (**s).clone()).is_none() {
                    inner.scenario_order.push(s.id);
                }
            }
            ImportedContent::Quiz(q) => {
                if inner.quizzes.insert(q.id, (**q).clone()).is_none() {
                    inner.quiz_order.push(q.id);
                }
            }
        }
        Ok(imported)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_scenarios(&self) -> Vec<Scenario> {
        let inner = self.inner.read().unwrap();
        inner
            .scenario_order
            .iter()
            .filter_map(|id| inner.scenarios.get(id).cloned())
            .collect()
    }

    async fn get_scenario(&self, id: Uuid) -> Option<Scenario> {
        self.inner.read().unwrap().scenarios.get(&id).cloned()
    }

    async fn insert_scenario(&self, scenario: Scenario) {
        let id = scenario.id;
        let mut inner = self.inner.write().unwrap();
        if inner.scenarios.insert(id, scenario).is_none() {
            inner.scenario_order.push(id);
        }
    }

    async fn list_quizzes(&self) -> Vec<Quiz> {
        let inner = self.inner.read().unwrap();
        inner
            .quiz_order
            .iter()
            .filter_map(|id| inner.quizzes.get(id).cloned())
            .collect()
    }

    async fn get_quiz(&self, id: Uuid) -> Option<Quiz> {
        self.inner.read().unwrap().quizzes.get(&id).cloned()
    }

    async fn insert_quiz(&self, quiz: Quiz) {
        let id = quiz.id;
        let mut inner = self.inner.write().unwrap();
        if inner.quizzes.insert(id, quiz).is_none() {
            inner.quiz_order.push(id);
        }
    }
}
