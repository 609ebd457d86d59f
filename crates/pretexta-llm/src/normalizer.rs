//! AI-challenge normalizer.
//!
//! Model-generated challenges arrive in loosely-shaped JSON. Normalization
//! is a strict parse-then-validate step: the payload either becomes a
//! well-formed [`ChallengeSet`] or the caller gets a typed error, never a
//! silently unusable challenge. Re-normalizing the normalizer's own output
//! is a no-op.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::sanitize::repair_json;

/// Fallback explanation when the model omitted one.
const DEFAULT_EXPLANATION: &str = "The explanation is shown after you answer.";

/// The challenge formats the generator supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Mixed question types.
    Comprehensive,
    /// Full phishing-email analysis.
    EmailAnalysis,
    /// Conversation-driven simulation.
    Interactive,
    /// Real-world branching scenarios.
    Scenario,
}

impl ChallengeKind {
    /// Stable string form, used in prompts and payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeKind::Comprehensive => "comprehensive",
            ChallengeKind::EmailAnalysis => "email_analysis",
            ChallengeKind::Interactive => "interactive",
            ChallengeKind::Scenario => "scenario",
        }
    }
}

/// Why a generated challenge was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// The payload was not parseable JSON even after repair.
    #[error("challenge payload is not valid JSON: {0}")]
    Unparseable(String),

    /// The payload had no `questions` array.
    #[error("challenge payload has no questions array")]
    MissingQuestions,

    /// The `questions` array was empty.
    #[error("challenge payload contains zero questions")]
    NoQuestions,

    /// A question lacked its text, which cannot be backfilled.
    #[error("question {0} is missing its question text")]
    MissingQuestionText(usize),
}

/// One normalized challenge question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeQuestion {
    /// Question id (`q<n>` when backfilled).
    pub id: String,
    /// Question type label.
    #[serde(rename = "type")]
    pub question_type: String,
    /// The question text.
    pub question: String,
    /// Supporting content (email body, scenario text, ...).
    #[serde(default)]
    pub content: String,
    /// Answer options; empty for open questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct answer, resolved to literal option text where possible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// Why the correct answer is correct.
    pub explanation: String,
    /// Step-by-step answering instructions.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Extra tips and caveats.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A normalized challenge ready to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSet {
    /// Challenge title.
    pub title: String,
    /// Attack category (phishing, pretexting, ...).
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Challenge format.
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    /// The questions, in presentation order.
    pub questions: Vec<ChallengeQuestion>,
}

/// Normalizes raw model output into a [`ChallengeSet`].
///
/// # Errors
///
/// Returns [`ChallengeError`] when the payload cannot be made playable.
pub fn normalize(raw: &str, kind: ChallengeKind) -> Result<ChallengeSet, ChallengeError> {
    let repaired = repair_json(raw);
    let value: Value = serde_json::from_str(&repaired)
        .map_err(|e| ChallengeError::Unparseable(e.to_string()))?;

    let questions_value = value
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(ChallengeError::MissingQuestions)?;
    if questions_value.is_empty() {
        return Err(ChallengeError::NoQuestions);
    }

    let mut questions = Vec::with_capacity(questions_value.len());
    for (index, question) in questions_value.iter().enumerate() {
        questions.push(normalize_question(question, index)?);
    }

    Ok(ChallengeSet {
        title: string_field(&value, &["challenge_title", "title"])
            .unwrap_or_else(|| "AI Challenge".to_owned()),
        category: string_field(&value, &["category"]).unwrap_or_else(|| "general".to_owned()),
        difficulty: string_field(&value, &["difficulty"]).unwrap_or_else(|| "medium".to_owned()),
        kind: value
            .get("type")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(kind),
        questions,
    })
}

/// Exact-match scoring: the submitted answer is correct when it equals the
/// resolved `correct_answer`, case-sensitive after trimming.
#[must_use]
pub fn is_correct(question: &ChallengeQuestion, answer: &str) -> bool {
    question
        .correct_answer
        .as_deref()
        .is_some_and(|correct| correct.trim() == answer.trim())
}

fn normalize_question(raw: &Value, index: usize) -> Result<ChallengeQuestion, ChallengeError> {
    let question = raw
        .get("question")
        .map(coerce_string)
        .filter(|s| !s.is_empty())
        .ok_or(ChallengeError::MissingQuestionText(index + 1))?;

    let options = normalize_options(raw.get("options"));
    let correct_answer = raw
        .get("correct_answer")
        .filter(|v| !v.is_null())
        .map(|v| resolve_correct_answer(v, &options));

    Ok(ChallengeQuestion {
        id: string_field(raw, &["id"]).unwrap_or_else(|| format!("q{}", index + 1)),
        question_type: string_field(raw, &["type"])
            .unwrap_or_else(|| "multiple_choice".to_owned()),
        question,
        content: raw.get("content").map(coerce_string).unwrap_or_default(),
        options,
        correct_answer,
        explanation: raw
            .get("explanation")
            .map(coerce_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_owned()),
        instructions: normalize_string_list(raw.get("instructions")),
        notes: normalize_string_list(raw.get("notes")),
    })
}

/// Options arrive as plain strings or `{ "text": ... }` objects.
fn normalize_options(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => map.get("text").map(coerce_string).unwrap_or_default(),
            other => coerce_string(other),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves a `correct_answer` given as an option letter (`B`), a 1-based
/// index (`2`), or free text into the literal option text. Unresolvable
/// values pass through as coerced text so open questions keep working.
fn resolve_correct_answer(raw: &Value, options: &[String]) -> String {
    if options.is_empty() {
        return coerce_string(raw);
    }

    if let Some(index) = raw.as_u64() {
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        if (1..=options.len()).contains(&index) {
            return options[index - 1].clone();
        }
    }

    let text = coerce_string(raw);
    let trimmed = text.trim();

    // An exact option match resolves to itself (and keeps re-normalization
    // a no-op even when an option text is a single letter).
    if let Some(exact) = options.iter().find(|o| o.as_str() == trimmed) {
        return exact.clone();
    }

    if trimmed.len() == 1 {
        if let Some(letter) = trimmed.chars().next().filter(char::is_ascii_alphabetic) {
            let index = (letter.to_ascii_uppercase() as usize) - ('A' as usize);
            if index < options.len() {
                return options[index].clone();
            }
        }
    }

    if let Ok(index) = trimmed.parse::<usize>() {
        if (1..=options.len()).contains(&index) {
            return options[index - 1].clone();
        }
    }

    if let Some(case_match) = options.iter().find(|o| o.eq_ignore_ascii_case(trimmed)) {
        return case_match.clone();
    }

    text
}

fn normalize_string_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items.iter().map(coerce_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// First present key, coerced to a string.
fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter(|v| !v.is_null())
        .map(coerce_string)
        .find(|s| !s.is_empty())
}

/// Strings pass through; everything else becomes its JSON string form.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds the generation prompt for a challenge kind.
#[must_use]
pub fn generation_prompt(
    kind: ChallengeKind,
    category: &str,
    difficulty: &str,
    num_questions: u32,
) -> String {
    let kind_instructions = match kind {
        ChallengeKind::Comprehensive => {
            "Mix question types: multiple choice (4-5 options), scenario analysis, \
             red-flag identification, and phishing-email analysis. Every question \
             carries question, type, content, options, correct_answer, explanation, \
             instructions, and notes fields."
        }
        ChallengeKind::EmailAnalysis => {
            "Every question presents a complete email (from, subject, body, headers) \
             in its content field. The analysis must cover sender identification, \
             red flags in the content, the psychological tactics used, and the \
             recommended action."
        }
        ChallengeKind::Interactive => {
            "Drive a conversation: the attacker opens with a social-engineering \
             technique, the participant picks between 3-4 responses, and each \
             response carries a susceptibility impact. Keep messages natural and \
             realistic with visible manipulation cues."
        }
        ChallengeKind::Scenario => {
            "Present real-world scenarios with detailed background, a trigger \
             event, available actions with consequences, and clear lessons \
             learned for each decision point."
        }
    };
    format!(
        "You are an expert social-engineering security trainer creating an \
         interactive challenge for awareness training.\n\n\
         Challenge type: {kind}\n\
         Category: {category}\n\
         Difficulty: {difficulty}\n\
         Number of questions: {num_questions}\n\n\
         {kind_instructions}\n\n\
         Reply with one JSON object: {{\"challenge_title\": \"...\", \
         \"category\": \"{category}\", \"difficulty\": \"{difficulty}\", \
         \"type\": \"{kind}\", \"questions\": [{{\"id\": \"q1\", \
         \"type\": \"multiple_choice\", \"question\": \"...\", \"content\": \"...\", \
         \"options\": [\"...\"], \"correct_answer\": \"...\", \
         \"explanation\": \"...\", \"instructions\": [\"...\"], \
         \"notes\": [\"...\"]}}]}}.\n\n\
         Generate EXACTLY {num_questions} questions. Ensure the JSON is valid. \
         Focus on learning, not just testing, and include practical tips.",
        kind = kind.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_challenge(correct_answer: Value) -> String {
        serde_json::json!({
            "challenge_title": "Phishing basics",
            "category": "phishing",
            "difficulty": "medium",
            "type": "comprehensive",
            "questions": [{
                "question": "Which reply is safest?",
                "options": ["X", "Y", "Z"],
                "correct_answer": correct_answer,
            }]
        })
        .to_string()
    }

    #[test]
    fn test_letter_answer_resolves_to_option_text() {
        let set = normalize(&raw_challenge("B".into()), ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set.questions[0].correct_answer.as_deref(), Some("Y"));
    }

    #[test]
    fn test_one_based_index_resolves_to_option_text() {
        let set = normalize(&raw_challenge(2.into()), ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set.questions[0].correct_answer.as_deref(), Some("Y"));
    }

    #[test]
    fn test_numeric_string_index_resolves_to_option_text() {
        let set = normalize(&raw_challenge("2".into()), ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set.questions[0].correct_answer.as_deref(), Some("Y"));
    }

    #[test]
    fn test_free_text_answer_matches_option_case_insensitively() {
        let set = normalize(&raw_challenge("y".into()), ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set.questions[0].correct_answer.as_deref(), Some("Y"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let set = normalize(&raw_challenge("B".into()), ChallengeKind::Comprehensive).unwrap();
        let reserialized = serde_json::to_string(&set).unwrap();
        let again = normalize(&reserialized, ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set, again);
    }

    #[test]
    fn test_backfills_id_type_and_explanation() {
        let set = normalize(&raw_challenge("B".into()), ChallengeKind::Comprehensive).unwrap();
        let question = &set.questions[0];
        assert_eq!(question.id, "q1");
        assert_eq!(question.question_type, "multiple_choice");
        assert_eq!(question.explanation, DEFAULT_EXPLANATION);
        assert!(question.instructions.is_empty());
        assert!(question.notes.is_empty());
    }

    #[test]
    fn test_object_options_are_flattened() {
        let raw = serde_json::json!({
            "questions": [{
                "question": "Pick one",
                "options": [{"text": "Report it"}, {"text": "Ignore it"}],
                "correct_answer": "A",
            }]
        })
        .to_string();
        let set = normalize(&raw, ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set.questions[0].options, vec!["Report it", "Ignore it"]);
        assert_eq!(
            set.questions[0].correct_answer.as_deref(),
            Some("Report it")
        );
    }

    #[test]
    fn test_non_string_question_is_coerced() {
        let raw = serde_json::json!({
            "questions": [{ "question": 42, "correct_answer": "anything" }]
        })
        .to_string();
        let set = normalize(&raw, ChallengeKind::Comprehensive).unwrap();
        assert_eq!(set.questions[0].question, "42");
    }

    #[test]
    fn test_missing_question_text_is_rejected() {
        let raw = serde_json::json!({ "questions": [{ "id": "q1" }] }).to_string();
        let result = normalize(&raw, ChallengeKind::Comprehensive);
        assert_eq!(result, Err(ChallengeError::MissingQuestionText(1)));
    }

    #[test]
    fn test_empty_questions_are_rejected() {
        let raw = serde_json::json!({ "questions": [] }).to_string();
        assert_eq!(
            normalize(&raw, ChallengeKind::Comprehensive),
            Err(ChallengeError::NoQuestions)
        );
    }

    #[test]
    fn test_prose_payload_is_rejected() {
        let result = normalize("I could not generate a challenge.", ChallengeKind::Scenario);
        assert!(matches!(result, Err(ChallengeError::Unparseable(_))));
    }

    #[test]
    fn test_fenced_payload_is_unwrapped() {
        let raw = format!("```json\n{}\n```", raw_challenge("B".into()));
        assert!(normalize(&raw, ChallengeKind::Comprehensive).is_ok());
    }

    #[test]
    fn test_scoring_is_exact_match_after_trim() {
        let set = normalize(&raw_challenge("B".into()), ChallengeKind::Comprehensive).unwrap();
        let question = &set.questions[0];
        assert!(is_correct(question, "Y"));
        assert!(is_correct(question, "  Y "));
        assert!(!is_correct(question, "y"));
        assert!(!is_correct(question, "Z"));
    }

    #[test]
    fn test_generation_prompt_names_kind_and_counts() {
        let prompt = generation_prompt(ChallengeKind::EmailAnalysis, "phishing", "hard", 5);
        assert!(prompt.contains("email_analysis"));
        assert!(prompt.contains("EXACTLY 5 questions"));
        assert!(prompt.contains("phishing"));
    }
}
