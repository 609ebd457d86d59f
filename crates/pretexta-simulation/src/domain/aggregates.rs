//! Aggregate roots for the Simulation Run context.

use chrono::{DateTime, Utc};
use pretexta_core::aggregate::AggregateRoot;
use pretexta_core::clock::Clock;
use pretexta_core::error::DomainError;
use pretexta_core::event::EventMetadata;
use pretexta_content::scenario::EndResult;
use uuid::Uuid;

use super::events::{
    AdaptiveInjected, AiChallengeSummary, ChoiceRecorded, QuizAnswerRecorded, RunCompleted,
    RunDeleted, RunEvent, RunEventKind, RunStarted, RunStatus, SimulationType, TraversalStep,
};
use super::player::clamp_score;

/// Score every scenario run begins with.
pub const INITIAL_SCORE: i32 = 100;

/// The aggregate root for a simulation run.
#[derive(Debug)]
pub struct SimulationRun {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Kind of activity, set by `run.started`.
    pub(crate) simulation_type: Option<SimulationType>,
    /// Scenario played, for challenge runs.
    pub(crate) challenge_id: Option<Uuid>,
    /// Quiz taken, for quiz runs.
    pub(crate) quiz_id: Option<Uuid>,
    /// Display title for the history list.
    pub(crate) title: Option<String>,
    /// Participant name for reports.
    pub(crate) participant_name: Option<String>,
    /// Extra summary for AI-challenge runs.
    pub(crate) ai_challenge: Option<AiChallengeSummary>,
    /// Lifecycle status.
    pub(crate) status: RunStatus,
    /// Running susceptibility score.
    pub(crate) score: i32,
    /// Traversal steps, in order.
    pub(crate) steps: Vec<TraversalStep>,
    /// Quiz answers, in order.
    pub(crate) answers: Vec<QuizAnswerRecorded>,
    /// Adaptive content injections, in order.
    pub(crate) adaptive_injections: Vec<AdaptiveInjected>,
    /// Outcome, once completed on an end node.
    pub(crate) result: Option<EndResult>,
    /// When the run started.
    pub(crate) started_at: Option<DateTime<Utc>>,
    /// When the run completed.
    pub(crate) completed_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<RunEvent>,
}

impl SimulationRun {
    /// Creates an empty run awaiting its `run.started` event.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            simulation_type: None,
            challenge_id: None,
            quiz_id: None,
            title: None,
            participant_name: None,
            ai_challenge: None,
            status: RunStatus::Running,
            score: INITIAL_SCORE,
            steps: Vec::new(),
            answers: Vec::new(),
            adaptive_injections: Vec::new(),
            result: None,
            started_at: None,
            completed_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn emit(&mut self, kind: RunEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event_type = match &kind {
            RunEventKind::RunStarted(_) => "run.started",
            RunEventKind::ChoiceRecorded(_) => "run.choice_recorded",
            RunEventKind::AdaptiveInjected(_) => "run.adaptive_injected",
            RunEventKind::QuizAnswerRecorded(_) => "run.quiz_answer_recorded",
            RunEventKind::RunCompleted(_) => "run.completed",
            RunEventKind::RunDeleted(_) => "run.deleted",
        };
        let event = RunEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: event_type.to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        // Keep in-memory state in step with what will be persisted. The
        // version only advances when events are applied from storage.
        self.apply_kind(&event.kind, event.metadata.occurred_at);
        self.uncommitted_events.push(event);
    }

    fn ensure_started(&self) -> Result<(), DomainError> {
        if self.simulation_type.is_none() {
            return Err(DomainError::AggregateNotFound(self.id));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), DomainError> {
        self.ensure_started()?;
        match self.status {
            RunStatus::Running => Ok(()),
            RunStatus::Completed => Err(DomainError::Validation(format!(
                "run {} is already completed",
                self.id
            ))),
            RunStatus::Deleted => Err(DomainError::Validation(format!(
                "run {} is deleted",
                self.id
            ))),
        }
    }

    /// Starts the run, producing a `run.started` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the run already has history.
    pub fn start(
        &mut self,
        simulation_type: SimulationType,
        challenge_id: Option<Uuid>,
        quiz_id: Option<Uuid>,
        title: Option<String>,
        participant_name: Option<String>,
        ai_challenge: Option<AiChallengeSummary>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.simulation_type.is_some() {
            return Err(DomainError::Validation(format!(
                "run {} already exists",
                self.id
            )));
        }
        self.emit(
            RunEventKind::RunStarted(RunStarted {
                run_id: self.id,
                simulation_type,
                challenge_id,
                quiz_id,
                title,
                participant_name,
                initial_score: INITIAL_SCORE,
                ai_challenge,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Records one scenario choice, clamping the running score to `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the run is completed or deleted
    /// and `DomainError::AggregateNotFound` if it was never started.
    pub fn record_choice(
        &mut self,
        node_id: String,
        action: String,
        score_impact: i32,
        next_node: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        let score_after = clamp_score(self.score + score_impact);
        self.emit(
            RunEventKind::ChoiceRecorded(ChoiceRecorded {
                run_id: self.id,
                step: TraversalStep {
                    node_id,
                    action,
                    score_impact,
                    next_node,
                    timestamp: clock.now(),
                },
                score_after,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Records that LLM-generated content was spliced into the graph.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the run is completed or deleted
    /// and `DomainError::AggregateNotFound` if it was never started.
    pub fn record_adaptive(
        &mut self,
        node_id: String,
        replaced_node: String,
        message: String,
        tactics_used: Vec<String>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.emit(
            RunEventKind::AdaptiveInjected(AdaptiveInjected {
                run_id: self.id,
                node_id,
                replaced_node,
                message,
                tactics_used,
                timestamp: clock.now(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Records one quiz answer (or a timer skip).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the run is completed or deleted
    /// and `DomainError::AggregateNotFound` if it was never started.
    pub fn record_quiz_answer(
        &mut self,
        question_id: String,
        answer_index: Option<u32>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.emit(
            RunEventKind::QuizAnswerRecorded(QuizAnswerRecorded {
                run_id: self.id,
                question_id,
                answer_index,
                timestamp: clock.now(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Completes the run. Terminal; later transitions are rejected.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the run is completed or deleted
    /// and `DomainError::AggregateNotFound` if it was never started.
    pub fn complete(
        &mut self,
        score: i32,
        result: Option<EndResult>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.emit(
            RunEventKind::RunCompleted(RunCompleted {
                run_id: self.id,
                score: clamp_score(score),
                result,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Soft-deletes the run, hiding it from listings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if already deleted and
    /// `DomainError::AggregateNotFound` if the run was never started.
    pub fn delete(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_started()?;
        if self.status == RunStatus::Deleted {
            return Err(DomainError::Validation(format!(
                "run {} is deleted",
                self.id
            )));
        }
        self.emit(
            RunEventKind::RunDeleted(RunDeleted { run_id: self.id }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Running susceptibility score.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Traversal steps recorded so far, in order.
    #[must_use]
    pub fn steps(&self) -> &[TraversalStep] {
        &self.steps
    }

    fn apply_kind(&mut self, kind: &RunEventKind, occurred_at: DateTime<Utc>) {
        match kind {
            RunEventKind::RunStarted(payload) => {
                self.simulation_type = Some(payload.simulation_type);
                self.challenge_id = payload.challenge_id;
                self.quiz_id = payload.quiz_id;
                self.title.clone_from(&payload.title);
                self.participant_name.clone_from(&payload.participant_name);
                self.ai_challenge.clone_from(&payload.ai_challenge);
                self.score = payload.initial_score;
                self.started_at = Some(occurred_at);
            }
            RunEventKind::ChoiceRecorded(payload) => {
                self.steps.push(payload.step.clone());
                self.score = payload.score_after;
            }
            RunEventKind::AdaptiveInjected(payload) => {
                self.adaptive_injections.push(payload.clone());
            }
            RunEventKind::QuizAnswerRecorded(payload) => {
                self.answers.push(payload.clone());
            }
            RunEventKind::RunCompleted(payload) => {
                self.status = RunStatus::Completed;
                self.score = payload.score;
                self.result = payload.result;
                self.completed_at = Some(occurred_at);
            }
            RunEventKind::RunDeleted(_) => {
                self.status = RunStatus::Deleted;
            }
        }
    }
}

impl AggregateRoot for SimulationRun {
    type Event = RunEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.apply_kind(&event.kind, event.metadata.occurred_at);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
