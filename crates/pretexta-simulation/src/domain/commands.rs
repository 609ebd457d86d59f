//! Commands for the Simulation Run context.

use uuid::Uuid;

use pretexta_content::scenario::EndResult;

use super::events::{AiChallengeSummary, SimulationType, TraversalStep};

/// Command to create a new run.
#[derive(Debug, Clone)]
pub struct StartRun {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The run to create.
    pub run_id: Uuid,
    /// Kind of activity.
    pub simulation_type: SimulationType,
    /// Scenario played, for challenge runs.
    pub challenge_id: Option<Uuid>,
    /// Quiz taken, for quiz runs.
    pub quiz_id: Option<Uuid>,
    /// Display title for the history list.
    pub title: Option<String>,
    /// Participant name for reports.
    pub participant_name: Option<String>,
    /// Extra summary for AI-challenge runs.
    pub ai_challenge: Option<AiChallengeSummary>,
}

/// Command to record one scenario choice.
#[derive(Debug, Clone)]
pub struct RecordChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The run the choice belongs to.
    pub run_id: Uuid,
    /// The question node the choice was made on.
    pub node_id: String,
    /// The option text the participant picked.
    pub action: String,
    /// Score delta of the chosen option.
    pub score_impact: i32,
    /// The destination node id.
    pub next_node: String,
}

/// Command to record an adaptive content injection.
#[derive(Debug, Clone)]
pub struct RecordAdaptive {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The run the injection belongs to.
    pub run_id: Uuid,
    /// Synthetic node id (`ai_<millis>`).
    pub node_id: String,
    /// The static node the content replaced.
    pub replaced_node: String,
    /// The generated attack message.
    pub message: String,
    /// Tactics the generator claims to have used.
    pub tactics_used: Vec<String>,
}

/// Command to record one quiz answer.
#[derive(Debug, Clone)]
pub struct RecordQuizAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The run the answer belongs to.
    pub run_id: Uuid,
    /// The question answered.
    pub question_id: String,
    /// Selected option index; `None` for a timer skip.
    pub answer_index: Option<u32>,
}

/// Command to finish a run.
#[derive(Debug, Clone)]
pub struct CompleteRun {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The run to complete.
    pub run_id: Uuid,
    /// Final score.
    pub score: i32,
    /// Outcome, when the run ended on a scenario end node.
    pub result: Option<EndResult>,
}

/// Command to soft-delete a run.
#[derive(Debug, Clone)]
pub struct DeleteRun {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The run to delete.
    pub run_id: Uuid,
}

/// Command to record a run that arrives already finished (quiz and
/// AI-challenge submissions post their full result in one request).
#[derive(Debug, Clone)]
pub struct SubmitCompletedRun {
    /// The command that would have started the run.
    pub start: StartRun,
    /// Scenario steps taken, in traversal order.
    pub steps: Vec<TraversalStep>,
    /// Quiz answers, in presentation order.
    pub answers: Vec<(String, Option<u32>)>,
    /// Final score.
    pub score: i32,
    /// Outcome, when known.
    pub result: Option<EndResult>,
}
