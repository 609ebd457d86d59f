//! Quiz content model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One selectable answer on a quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// English option text.
    pub text: String,
    /// Optional Indonesian option text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    /// Whether this option is the correct answer.
    #[serde(default)]
    pub correct: bool,
}

/// Localized question text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuizQuestionContent {
    /// The question shown to the participant.
    #[serde(default)]
    pub text: String,
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question id, unique within the quiz.
    pub id: String,
    /// English content.
    pub content_en: QuizQuestionContent,
    /// Optional Indonesian content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<QuizQuestionContent>,
    /// Selectable answers.
    pub options: Vec<QuizOption>,
}

/// A quiz on social-engineering awareness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Quiz identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Short description for the catalog.
    pub description: String,
    /// Difficulty label (easy, medium, hard).
    pub difficulty: String,
    /// Cialdini persuasion principles this quiz exercises.
    #[serde(default)]
    pub cialdini_categories: Vec<String>,
    /// The questions, in presentation order.
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Looks up a question by id.
    #[must_use]
    pub fn question(&self, id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }
}
