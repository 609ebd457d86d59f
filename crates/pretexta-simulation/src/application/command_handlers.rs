//! Command handlers for the Simulation Run context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.

use pretexta_core::aggregate::AggregateRoot;
use pretexta_core::clock::Clock;
use pretexta_core::error::DomainError;
use pretexta_core::event::DomainEvent;
use pretexta_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

use crate::domain::aggregates::SimulationRun;
use crate::domain::commands::{
    CompleteRun, DeleteRun, RecordAdaptive, RecordChoice, RecordQuizAnswer, StartRun,
    SubmitCompletedRun,
};
use crate::domain::events::{RunEvent, RunEventKind};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct RunCommandResult {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

fn to_stored_event(event: &RunEvent) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        aggregate_id: meta.aggregate_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        causation_id: meta.causation_id,
        occurred_at: meta.occurred_at,
    }
}

/// Reconstitutes a `SimulationRun` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    run_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<SimulationRun, DomainError> {
    let mut run = SimulationRun::new(run_id);
    for stored in existing_events {
        let kind: RunEventKind = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Infrastructure(format!("event deserialization failed: {e}"))
        })?;
        let event = RunEvent {
            metadata: pretexta_core::event::EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        };
        run.apply(&event);
    }
    Ok(run)
}

async fn persist(
    run: &SimulationRun,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = run
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();

    repo.append_events(run.id, run.version, &stored_events)
        .await?;

    Ok(RunCommandResult {
        aggregate_id: run.id,
        stored_events,
    })
}

async fn load_existing(
    run_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<SimulationRun, DomainError> {
    let existing_events = repo.load_events(run_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(run_id));
    }
    reconstitute(run_id, &existing_events)
}

/// Handles the `StartRun` command: creates a new aggregate, starts the run,
/// and persists the resulting events.
///
/// # Errors
///
/// Returns `DomainError` if a run with this ID already exists or if event
/// appending fails.
pub async fn handle_start_run(
    command: &StartRun,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let existing_events = repo.load_events(command.run_id).await?;
    if !existing_events.is_empty() {
        return Err(DomainError::Validation(format!(
            "run {} already exists",
            command.run_id
        )));
    }

    let mut run = SimulationRun::new(command.run_id);
    run.start(
        command.simulation_type,
        command.challenge_id,
        command.quiz_id,
        command.title.clone(),
        command.participant_name.clone(),
        command.ai_challenge.clone(),
        command.correlation_id,
        clock,
    )?;

    persist(&run, repo).await
}

/// Handles the `RecordChoice` command: reconstitutes the aggregate, records
/// the scenario choice, and persists the resulting events.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails, if the run does
/// not exist, or if it is no longer running.
pub async fn handle_record_choice(
    command: &RecordChoice,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let mut run = load_existing(command.run_id, repo).await?;

    run.record_choice(
        command.node_id.clone(),
        command.action.clone(),
        command.score_impact,
        command.next_node.clone(),
        command.correlation_id,
        clock,
    )?;

    persist(&run, repo).await
}

/// Handles the `RecordAdaptive` command: reconstitutes the aggregate, records
/// the adaptive injection, and persists the resulting events.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails, if the run does
/// not exist, or if it is no longer running.
pub async fn handle_record_adaptive(
    command: &RecordAdaptive,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let mut run = load_existing(command.run_id, repo).await?;

    run.record_adaptive(
        command.node_id.clone(),
        command.replaced_node.clone(),
        command.message.clone(),
        command.tactics_used.clone(),
        command.correlation_id,
        clock,
    )?;

    persist(&run, repo).await
}

/// Handles the `RecordQuizAnswer` command: reconstitutes the aggregate,
/// records the answer, and persists the resulting events.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails, if the run does
/// not exist, or if it is no longer running.
pub async fn handle_record_quiz_answer(
    command: &RecordQuizAnswer,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let mut run = load_existing(command.run_id, repo).await?;

    run.record_quiz_answer(
        command.question_id.clone(),
        command.answer_index,
        command.correlation_id,
        clock,
    )?;

    persist(&run, repo).await
}

/// Handles the `CompleteRun` command: reconstitutes the aggregate, completes
/// the run, and persists the resulting events.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails, if the run does
/// not exist, or if it already finished.
pub async fn handle_complete_run(
    command: &CompleteRun,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let mut run = load_existing(command.run_id, repo).await?;

    run.complete(command.score, command.result, command.correlation_id, clock)?;

    persist(&run, repo).await
}

/// Handles the `DeleteRun` command: reconstitutes the aggregate, soft-deletes
/// the run, and persists the resulting events.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails, if the run does
/// not exist, or if it is already deleted.
pub async fn handle_delete_run(
    command: &DeleteRun,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let mut run = load_existing(command.run_id, repo).await?;

    run.delete(command.correlation_id, clock)?;

    persist(&run, repo).await
}

/// Handles the `SubmitCompletedRun` command: quiz and AI-challenge clients
/// post their whole result in one request, so the full event stream (started,
/// each step and answer, completed) is produced and persisted in one append.
///
/// # Errors
///
/// Returns `DomainError` if a run with this ID already exists or if event
/// appending fails.
pub async fn handle_submit_completed_run(
    command: &SubmitCompletedRun,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RunCommandResult, DomainError> {
    let start = &command.start;
    let existing_events = repo.load_events(start.run_id).await?;
    if !existing_events.is_empty() {
        return Err(DomainError::Validation(format!(
            "run {} already exists",
            start.run_id
        )));
    }

    let mut run = SimulationRun::new(start.run_id);
    run.start(
        start.simulation_type,
        start.challenge_id,
        start.quiz_id,
        start.title.clone(),
        start.participant_name.clone(),
        start.ai_challenge.clone(),
        start.correlation_id,
        clock,
    )?;
    for step in &command.steps {
        run.record_choice(
            step.node_id.clone(),
            step.action.clone(),
            step.score_impact,
            step.next_node.clone(),
            start.correlation_id,
            clock,
        )?;
    }
    for (question_id, answer_index) in &command.answers {
        run.record_quiz_answer(
            question_id.clone(),
            *answer_index,
            start.correlation_id,
            clock,
        )?;
    }
    run.complete(command.score, command.result, start.correlation_id, clock)?;

    persist(&run, repo).await
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pretexta_core::error::DomainError;
    use pretexta_core::repository::StoredEvent;
    use uuid::Uuid;

    use crate::application::command_handlers::{
        handle_complete_run, handle_delete_run, handle_record_choice, handle_start_run,
        handle_submit_completed_run,
    };
    use crate::domain::commands::{
        CompleteRun, DeleteRun, RecordChoice, StartRun, SubmitCompletedRun,
    };
    use crate::domain::events::{RunEventKind, RunStarted, SimulationType, TraversalStep};
    use pretexta_content::scenario::EndResult;
    use pretexta_test_support::{FixedClock, RecordingEventRepository};

    fn start_command(run_id: Uuid, correlation_id: Uuid) -> StartRun {
        StartRun {
            correlation_id,
            run_id,
            simulation_type: SimulationType::Challenge,
            challenge_id: Some(Uuid::new_v4()),
            quiz_id: None,
            title: Some("CEO wire transfer".to_owned()),
            participant_name: None,
            ai_challenge: None,
        }
    }

    fn run_started_event(run_id: Uuid, fixed_now: DateTime<Utc>) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: run_id,
            event_type: "run.started".to_owned(),
            payload: serde_json::to_value(RunEventKind::RunStarted(RunStarted {
                run_id,
                simulation_type: SimulationType::Challenge,
                challenge_id: Some(Uuid::new_v4()),
                quiz_id: None,
                title: None,
                participant_name: None,
                initial_score: 100,
                ai_challenge: None,
            }))
            .unwrap(),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: fixed_now,
        }
    }

    #[tokio::test]
    async fn test_handle_start_run_persists_run_started_event() {
        // Arrange
        let run_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = RecordingEventRepository::new(Ok(Vec::new()));

        let command = start_command(run_id, correlation_id);

        // Act
        let result = handle_start_run(&command, &clock, &repo).await;

        // Assert
        let cmd_result = result.unwrap();
        assert_eq!(cmd_result.aggregate_id, run_id);
        assert_eq!(cmd_result.stored_events.len(), 1);

        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);

        let (agg_id, expected_version, events) = &appended[0];
        assert_eq!(*agg_id, run_id);
        assert_eq!(*expected_version, 0);
        assert_eq!(events.len(), 1);

        let stored = &events[0];
        assert_eq!(stored.event_type, "run.started");
        assert_eq!(stored.sequence_number, 1);
        assert_eq!(stored.correlation_id, correlation_id);
        assert_eq!(stored.causation_id, correlation_id);
        assert_eq!(stored.occurred_at, fixed_now);
    }

    #[tokio::test]
    async fn test_handle_start_run_rejects_existing_run_id() {
        // Arrange
        let run_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = RecordingEventRepository::new(Ok(vec![run_started_event(run_id, fixed_now)]));

        let command = start_command(run_id, Uuid::new_v4());

        // Act
        let result = handle_start_run(&command, &clock, &repo).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_record_choice_appends_after_existing_stream() {
        // Arrange
        let run_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = RecordingEventRepository::new(Ok(vec![run_started_event(run_id, fixed_now)]));

        let command = RecordChoice {
            correlation_id,
            run_id,
            node_id: "start".to_owned(),
            action: "optionA".to_owned(),
            score_impact: -20,
            next_node: "q2".to_owned(),
        };

        // Act
        let result = handle_record_choice(&command, &clock, &repo).await;

        // Assert
        let cmd_result = result.unwrap();
        assert_eq!(cmd_result.stored_events.len(), 1);

        let appended = repo.appended_events();
        let (agg_id, expected_version, events) = &appended[0];
        assert_eq!(*agg_id, run_id);
        assert_eq!(*expected_version, 1);
        assert_eq!(events[0].event_type, "run.choice_recorded");
        assert_eq!(events[0].sequence_number, 2);
    }

    #[tokio::test]
    async fn test_handle_record_choice_returns_error_when_run_not_found() {
        // Arrange
        let run_id = Uuid::new_v4();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        let repo = RecordingEventRepository::new(Ok(Vec::new()));

        let command = RecordChoice {
            correlation_id: Uuid::new_v4(),
            run_id,
            node_id: "start".to_owned(),
            action: "optionA".to_owned(),
            score_impact: -20,
            next_node: "q2".to_owned(),
        };

        // Act
        let result = handle_record_choice(&command, &clock, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, run_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_complete_run_persists_run_completed_event() {
        // Arrange
        let run_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = RecordingEventRepository::new(Ok(vec![run_started_event(run_id, fixed_now)]));

        let command = CompleteRun {
            correlation_id: Uuid::new_v4(),
            run_id,
            score: 40,
            result: Some(EndResult::Failure),
        };

        // Act
        let result = handle_complete_run(&command, &clock, &repo).await;

        // Assert
        let cmd_result = result.unwrap();
        assert_eq!(cmd_result.stored_events[0].event_type, "run.completed");
        assert_eq!(cmd_result.stored_events[0].sequence_number, 2);
    }

    #[tokio::test]
    async fn test_handle_delete_run_persists_run_deleted_event() {
        // Arrange
        let run_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = RecordingEventRepository::new(Ok(vec![run_started_event(run_id, fixed_now)]));

        let command = DeleteRun {
            correlation_id: Uuid::new_v4(),
            run_id,
        };

        // Act
        let result = handle_delete_run(&command, &clock, &repo).await;

        // Assert
        let cmd_result = result.unwrap();
        assert_eq!(cmd_result.stored_events[0].event_type, "run.deleted");
    }

    #[tokio::test]
    async fn test_handle_submit_completed_run_persists_full_stream_in_one_append() {
        // Arrange
        let run_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = RecordingEventRepository::new(Ok(Vec::new()));

        let command = SubmitCompletedRun {
            start: start_command(run_id, correlation_id),
            steps: vec![
                TraversalStep {
                    node_id: "start".to_owned(),
                    action: "optionA".to_owned(),
                    score_impact: -20,
                    next_node: "q2".to_owned(),
                    timestamp: fixed_now,
                },
                TraversalStep {
                    node_id: "q2".to_owned(),
                    action: "optionB".to_owned(),
                    score_impact: -40,
                    next_node: "end".to_owned(),
                    timestamp: fixed_now,
                },
            ],
            answers: Vec::new(),
            score: 40,
            result: Some(EndResult::Failure),
        };

        // Act
        let result = handle_submit_completed_run(&command, &clock, &repo).await;

        // Assert
        let cmd_result = result.unwrap();
        assert_eq!(cmd_result.stored_events.len(), 4);

        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);

        let (_, expected_version, events) = &appended[0];
        assert_eq!(*expected_version, 0);
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "run.started",
                "run.choice_recorded",
                "run.choice_recorded",
                "run.completed"
            ]
        );
        let sequences: Vec<i64> = events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);
    }
}
