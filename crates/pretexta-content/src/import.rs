//! YAML import for authored content.
//!
//! Authoring happens in YAML files with a top-level `type` discriminator and
//! the document body under `data`. Imported scenarios are graph-validated
//! before they are accepted.

use serde::Deserialize;
use thiserror::Error;

use crate::graph::{GraphError, validate_scenario};
use crate::quiz::Quiz;
use crate::scenario::Scenario;

/// Import failure.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document is not valid YAML or does not match the content schema.
    #[error("malformed content document: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// The document's `type` field names an unknown content kind.
    #[error("unknown content type `{0}`")]
    UnknownType(String),

    /// The scenario graph failed validation.
    #[error("invalid scenario graph: {0}")]
    InvalidGraph(#[from] GraphError),
}

/// A successfully imported content document.
#[derive(Debug)]
pub enum ImportedContent {
    /// A branching scenario.
    Scenario(Box<Scenario>),
    /// A quiz.
    Quiz(Box<Quiz>),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    kind: String,
    data: serde_yaml::Value,
}

/// Parses and validates one YAML content document.
///
/// # Errors
///
/// Returns [`ImportError`] when the document is malformed, names an unknown
/// type, or contains an invalid scenario graph.
pub fn import_yaml(source: &str) -> Result<ImportedContent, ImportError> {
    let raw: RawDocument = serde_yaml::from_str(source)?;
    match raw.kind.as_str() {
        // `challenge` is the historical name for a scenario document.
        "challenge" | "scenario" => {
            let scenario: Scenario = serde_yaml::from_value(raw.data)?;
            validate_scenario(&scenario)?;
            Ok(ImportedContent::Scenario(Box::new(scenario)))
        }
        "quiz" => {
            let quiz: Quiz = serde_yaml::from_value(raw.data)?;
            Ok(ImportedContent::Quiz(Box::new(quiz)))
        }
        other => Err(ImportError::UnknownType(other.to_owned())),
    }
}
