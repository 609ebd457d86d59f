//! Domain events for the Simulation Run context.

use chrono::{DateTime, Utc};
use pretexta_core::event::{DomainEvent, EventMetadata};
use pretexta_content::scenario::EndResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of training activity a run records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationType {
    /// A branching scenario play-through.
    Challenge,
    /// A quiz attempt.
    Quiz,
    /// An LLM-generated challenge.
    AiChallenge,
}

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// In progress.
    Running,
    /// Finished; no further transitions.
    Completed,
    /// Soft-deleted; hidden from listings.
    Deleted,
}

/// One step of the participant's path through the node graph. Insertion
/// order is traversal order and is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalStep {
    /// The question node the choice was made on.
    pub node_id: String,
    /// The option text the participant picked.
    pub action: String,
    /// Score delta of the chosen option.
    pub score_impact: i32,
    /// The destination node id.
    pub next_node: String,
    /// When the choice was made.
    pub timestamp: DateTime<Utc>,
}

/// Summary fields attached to AI-challenge runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiChallengeSummary {
    /// Challenge kind (comprehensive, email_analysis, interactive, scenario).
    pub challenge_type: String,
    /// Attack category (phishing, pretexting, ...).
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Total questions asked.
    pub total_questions: u32,
    /// Questions answered correctly.
    pub correct_answers: u32,
}

/// Emitted when a run is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStarted {
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// Kind of activity.
    pub simulation_type: SimulationType,
    /// Scenario played, when `simulation_type` is `Challenge`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<Uuid>,
    /// Quiz taken, when `simulation_type` is `Quiz`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<Uuid>,
    /// Display title for the history list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Participant name for reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    /// Starting susceptibility score.
    pub initial_score: i32,
    /// Extra summary for AI-challenge runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_challenge: Option<AiChallengeSummary>,
}

/// Emitted for every option chosen on a question node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceRecorded {
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// The traversal step taken.
    pub step: TraversalStep,
    /// Running score after the clamped delta was applied.
    pub score_after: i32,
}

/// Emitted when LLM-generated content is spliced into the graph in place
/// of a static node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveInjected {
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// Synthetic node id (`ai_<millis>`).
    pub node_id: String,
    /// The static node the content replaced.
    pub replaced_node: String,
    /// The generated attack message.
    pub message: String,
    /// Tactics the generator claims to have used.
    pub tactics_used: Vec<String>,
    /// When the content was injected.
    pub timestamp: DateTime<Utc>,
}

/// Emitted for every quiz question answered (or skipped on timeout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswerRecorded {
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// The question answered.
    pub question_id: String,
    /// Selected option index; `None` when the timer expired unanswered.
    pub answer_index: Option<u32>,
    /// When the answer was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a run reaches an end node or a completed result is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCompleted {
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// Final score.
    pub score: i32,
    /// Outcome, when the run ended on a scenario end node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<EndResult>,
}

/// Emitted when a run is soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDeleted {
    /// The run this event belongs to.
    pub run_id: Uuid,
}

/// Event payload variants for the Simulation Run context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEventKind {
    /// A run was created.
    RunStarted(RunStarted),
    /// A scenario choice was recorded.
    ChoiceRecorded(ChoiceRecorded),
    /// Adaptive content was spliced into the graph.
    AdaptiveInjected(AdaptiveInjected),
    /// A quiz answer was recorded.
    QuizAnswerRecorded(QuizAnswerRecorded),
    /// The run finished.
    RunCompleted(RunCompleted),
    /// The run was soft-deleted.
    RunDeleted(RunDeleted),
}

/// Domain event envelope for the Simulation Run context.
#[derive(Debug, Clone)]
pub struct RunEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: RunEventKind,
}

impl DomainEvent for RunEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            RunEventKind::RunStarted(_) => "run.started",
            RunEventKind::ChoiceRecorded(_) => "run.choice_recorded",
            RunEventKind::AdaptiveInjected(_) => "run.adaptive_injected",
            RunEventKind::QuizAnswerRecorded(_) => "run.quiz_answer_recorded",
            RunEventKind::RunCompleted(_) => "run.completed",
            RunEventKind::RunDeleted(_) => "run.deleted",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("RunEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
