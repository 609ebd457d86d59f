//! Query handlers for the Simulation Run context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use chrono::{DateTime, Utc};
use pretexta_content::scenario::EndResult;
use pretexta_core::error::DomainError;
use pretexta_core::repository::EventRepository;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::SimulationRun;
use crate::domain::events::{
    AdaptiveInjected, AiChallengeSummary, RunStatus, SimulationType, TraversalStep,
};

/// Read-only view of a simulation run aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct RunView {
    /// The run identifier.
    pub run_id: Uuid,
    /// Kind of activity.
    pub simulation_type: SimulationType,
    /// Scenario played, for challenge runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<Uuid>,
    /// Quiz taken, for quiz runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<Uuid>,
    /// Display title for the history list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Participant name for reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    /// Extra summary for AI-challenge runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_challenge: Option<AiChallengeSummary>,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Susceptibility score, running or final.
    pub score: i32,
    /// Traversal steps taken so far, in order.
    pub steps: Vec<TraversalStep>,
    /// Quiz answers as `(question_id, answer_index)`, in order.
    pub answers: Vec<(String, Option<u32>)>,
    /// Adaptive content injections, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adaptive_injections: Vec<AdaptiveInjected>,
    /// Outcome, once completed on an end node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EndResult>,
    /// When the run started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the run completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Current version (event count).
    pub version: i64,
}

fn to_view(run: &SimulationRun, simulation_type: SimulationType) -> RunView {
    RunView {
        run_id: run.id,
        simulation_type,
        challenge_id: run.challenge_id,
        quiz_id: run.quiz_id,
        title: run.title.clone(),
        participant_name: run.participant_name.clone(),
        ai_challenge: run.ai_challenge.clone(),
        status: run.status(),
        score: run.score(),
        steps: run.steps.clone(),
        answers: run
            .answers
            .iter()
            .map(|a| (a.question_id.clone(), a.answer_index))
            .collect(),
        adaptive_injections: run.adaptive_injections.clone(),
        result: run.result,
        started_at: run.started_at,
        completed_at: run.completed_at,
        version: run.version,
    }
}

/// Retrieves a simulation run by its aggregate ID. Deleted runs are
/// still retrievable here; listings filter them out.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_run_by_id(
    run_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<RunView, DomainError> {
    let stored_events = repo.load_events(run_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(run_id));
    }
    let run = command_handlers::reconstitute(run_id, &stored_events)?;
    let simulation_type = run
        .simulation_type
        .ok_or(DomainError::AggregateNotFound(run_id))?;
    Ok(to_view(&run, simulation_type))
}

/// Lists every non-deleted run, newest first.
///
/// A stream that fails to reconstitute is skipped with a warning rather than
/// failing the whole listing.
///
/// # Errors
///
/// Returns `DomainError` if the event store cannot be read.
pub async fn list_runs(repo: &dyn EventRepository) -> Result<Vec<RunView>, DomainError> {
    let mut views = Vec::new();
    for run_id in repo.list_aggregate_ids().await? {
        match get_run_by_id(run_id, repo).await {
            Ok(view) => {
                if view.status != RunStatus::Deleted {
                    views.push(view);
                }
            }
            Err(DomainError::AggregateNotFound(_)) => {}
            Err(error) => {
                warn!(%run_id, %error, "skipping unreadable run stream");
            }
        }
    }
    views.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Ok(views)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretexta_core::error::DomainError;
    use pretexta_core::repository::{EventRepository, StoredEvent};
    use uuid::Uuid;

    use crate::application::query_handlers::{get_run_by_id, list_runs};
    use crate::domain::events::{
        RunCompleted, RunDeleted, RunEventKind, RunStarted, RunStatus, SimulationType,
    };
    use pretexta_test_support::{EmptyEventRepository, InMemoryEventRepository};

    fn stored(
        run_id: Uuid,
        sequence_number: i64,
        kind: &RunEventKind,
        occurred_at: chrono::DateTime<Utc>,
    ) -> StoredEvent {
        let event_type = match kind {
            RunEventKind::RunStarted(_) => "run.started",
            RunEventKind::ChoiceRecorded(_) => "run.choice_recorded",
            RunEventKind::AdaptiveInjected(_) => "run.adaptive_injected",
            RunEventKind::QuizAnswerRecorded(_) => "run.quiz_answer_recorded",
            RunEventKind::RunCompleted(_) => "run.completed",
            RunEventKind::RunDeleted(_) => "run.deleted",
        };
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: run_id,
            event_type: event_type.to_owned(),
            payload: serde_json::to_value(kind).unwrap(),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at,
        }
    }

    fn started(run_id: Uuid, title: &str) -> RunEventKind {
        RunEventKind::RunStarted(RunStarted {
            run_id,
            simulation_type: SimulationType::Challenge,
            challenge_id: Some(Uuid::new_v4()),
            quiz_id: None,
            title: Some(title.to_owned()),
            participant_name: None,
            initial_score: 100,
            ai_challenge: None,
        })
    }

    #[tokio::test]
    async fn test_get_run_by_id_returns_view_with_state() {
        // Arrange
        let run_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let repo = InMemoryEventRepository::new();
        repo.append_events(
            run_id,
            0,
            &[
                stored(run_id, 1, &started(run_id, "CEO wire transfer"), fixed_now),
                stored(
                    run_id,
                    2,
                    &RunEventKind::RunCompleted(RunCompleted {
                        run_id,
                        score: 40,
                        result: None,
                    }),
                    fixed_now,
                ),
            ],
        )
        .await
        .unwrap();

        // Act
        let view = get_run_by_id(run_id, &repo).await.unwrap();

        // Assert
        assert_eq!(view.run_id, run_id);
        assert_eq!(view.title.as_deref(), Some("CEO wire transfer"));
        assert_eq!(view.status, RunStatus::Completed);
        assert_eq!(view.score, 40);
        assert_eq!(view.started_at, Some(fixed_now));
        assert_eq!(view.completed_at, Some(fixed_now));
        assert_eq!(view.version, 2);
    }

    #[tokio::test]
    async fn test_get_run_by_id_returns_not_found_when_no_events() {
        // Arrange
        let run_id = Uuid::new_v4();
        let repo = EmptyEventRepository;

        // Act
        let result = get_run_by_id(run_id, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, run_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_runs_hides_deleted_and_sorts_newest_first() {
        // Arrange
        let older_id = Uuid::new_v4();
        let newer_id = Uuid::new_v4();
        let deleted_id = Uuid::new_v4();
        let older_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let newer_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        let repo = InMemoryEventRepository::new();
        repo.append_events(older_id, 0, &[stored(older_id, 1, &started(older_id, "older"), older_at)])
            .await
            .unwrap();
        repo.append_events(newer_id, 0, &[stored(newer_id, 1, &started(newer_id, "newer"), newer_at)])
            .await
            .unwrap();
        repo.append_events(
            deleted_id,
            0,
            &[
                stored(deleted_id, 1, &started(deleted_id, "gone"), older_at),
                stored(
                    deleted_id,
                    2,
                    &RunEventKind::RunDeleted(RunDeleted { run_id: deleted_id }),
                    newer_at,
                ),
            ],
        )
        .await
        .unwrap();

        // Act
        let views = list_runs(&repo).await.unwrap();

        // Assert
        let ids: Vec<Uuid> = views.iter().map(|v| v.run_id).collect();
        assert_eq!(ids, vec![newer_id, older_id]);
    }
}
