//! Simulation run routes.
//!
//! Scenario play-throughs post a run up front and append traversal events as
//! they happen; quiz and AI-challenge clients post their whole result in one
//! request with `completed: true`. Quiz submissions are re-graded server-side
//! against the stored quiz, so a tampered client score is ignored, and
//! scenario steps are replayed against the stored graph before recording.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use pretexta_content::scenario::EndResult;
use pretexta_content::store::ContentStore;
use pretexta_simulation::domain::player;
use pretexta_core::clock::Clock;
use pretexta_core::error::DomainError;
use pretexta_quiz::Answer;
use pretexta_simulation::application::command_handlers;
use pretexta_simulation::application::query_handlers::{self, RunView};
use pretexta_simulation::domain::commands::{
    CompleteRun, DeleteRun, RecordAdaptive, RecordChoice, RecordQuizAnswer, StartRun,
    SubmitCompletedRun,
};
use pretexta_simulation::domain::events::{AiChallengeSummary, SimulationType, TraversalStep};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// One traversal step in a request body.
#[derive(Debug, Deserialize)]
pub struct StepBody {
    /// The question node the choice was made on.
    pub node_id: String,
    /// The option text the participant picked.
    pub action: String,
    /// Score delta of the chosen option.
    pub score_impact: i32,
    /// The destination node id.
    pub next_node: String,
}

/// One quiz answer in a request body.
#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    /// The question answered.
    pub question_id: String,
    /// Selected option index; absent for a timer skip.
    #[serde(default)]
    pub answer_index: Option<u32>,
}

/// One adaptive injection in a request body.
#[derive(Debug, Deserialize)]
pub struct AdaptiveBody {
    /// Synthetic node id (`ai_<millis>`).
    pub node_id: String,
    /// The static node the content replaced.
    pub replaced_node: String,
    /// The generated attack message.
    pub message: String,
    /// Tactics the generator claims to have used.
    #[serde(default)]
    pub tactics_used: Vec<String>,
}

/// Request body for POST /api/simulations.
#[derive(Debug, Deserialize)]
pub struct CreateRunRequest {
    /// Run id; generated when absent.
    #[serde(default)]
    pub run_id: Option<Uuid>,
    /// Kind of activity.
    pub simulation_type: SimulationType,
    /// Scenario played, for challenge runs.
    #[serde(default)]
    pub challenge_id: Option<Uuid>,
    /// Quiz taken, for quiz runs.
    #[serde(default)]
    pub quiz_id: Option<Uuid>,
    /// Display title for the history list.
    #[serde(default)]
    pub title: Option<String>,
    /// Participant name for reports.
    #[serde(default)]
    pub participant_name: Option<String>,
    /// Extra summary for AI-challenge runs.
    #[serde(default)]
    pub ai_challenge: Option<AiChallengeSummary>,
    /// Whether this body carries a finished result.
    #[serde(default)]
    pub completed: bool,
    /// Steps taken, for completed submissions.
    #[serde(default)]
    pub steps: Vec<StepBody>,
    /// Quiz answers, for completed submissions.
    #[serde(default)]
    pub answers: Vec<AnswerBody>,
    /// Final score, for completed non-quiz submissions.
    #[serde(default)]
    pub score: Option<i32>,
    /// Outcome, when the run ended on a scenario end node.
    #[serde(default)]
    pub result: Option<EndResult>,
}

/// Request body for PUT /api/simulations/{id}.
///
/// Clients send the full step and answer lists; entries already recorded in
/// the event stream are skipped, the rest are appended.
#[derive(Debug, Deserialize)]
pub struct UpdateRunRequest {
    /// Full step list, oldest first.
    #[serde(default)]
    pub steps: Vec<StepBody>,
    /// Full answer list, in presentation order.
    #[serde(default)]
    pub answers: Vec<AnswerBody>,
    /// Full adaptive injection list, oldest first.
    #[serde(default)]
    pub adaptive: Vec<AdaptiveBody>,
    /// Whether to complete the run.
    #[serde(default)]
    pub completed: bool,
    /// Final score; defaults to the running score.
    #[serde(default)]
    pub score: Option<i32>,
    /// Outcome, when the run ended on a scenario end node.
    #[serde(default)]
    pub result: Option<EndResult>,
}

fn answers_as_pairs(answers: &[AnswerBody]) -> Vec<(String, Option<u32>)> {
    answers
        .iter()
        .map(|a| (a.question_id.clone(), a.answer_index))
        .collect()
}

/// Checks posted steps against the stored scenario before they are recorded.
/// Runs against content this server does not hold (imported histories) are
/// accepted as-is.
async fn verify_posted_steps(
    state: &AppState,
    challenge_id: Option<Uuid>,
    recorded: &[TraversalStep],
    score: i32,
    posted: &[TraversalStep],
) -> Result<(), ApiError> {
    let Some(challenge_id) = challenge_id else {
        return Ok(());
    };
    let Some(scenario) = state.content.get_scenario(challenge_id).await else {
        return Ok(());
    };
    player::verify_steps(&scenario, recorded, score, posted)
        .map_err(|e| DomainError::Validation(e.to_string()))?;
    Ok(())
}

/// Resolves the final score of a completed submission. Quiz runs are graded
/// against the stored quiz; everything else must carry its score.
async fn resolve_score(
    state: &AppState,
    request: &CreateRunRequest,
) -> Result<i32, ApiError> {
    if let Some(quiz_id) = request.quiz_id {
        let quiz = state
            .content
            .get_quiz(quiz_id)
            .await
            .ok_or(DomainError::AggregateNotFound(quiz_id))?;
        let answers: Vec<(String, Answer)> = request
            .answers
            .iter()
            .map(|a| {
                let answer = a
                    .answer_index
                    .map_or(Answer::Skipped, |i| Answer::Selected(i as usize));
                (a.question_id.clone(), answer)
            })
            .collect();
        return Ok(pretexta_quiz::grade(&quiz, &answers).score);
    }
    request.score.ok_or_else(|| {
        ApiError::Domain(DomainError::Validation(
            "completed submission requires a score".to_owned(),
        ))
    })
}

/// POST /api/simulations
#[instrument(skip(state, request), fields(simulation_type = ?request.simulation_type))]
async fn create(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(request): Json<CreateRunRequest>,
) -> Result<(StatusCode, Json<RunView>), ApiError> {
    let run_id = request.run_id.unwrap_or_else(Uuid::new_v4);
    let correlation_id = Uuid::new_v4();

    let start = StartRun {
        correlation_id,
        run_id,
        simulation_type: request.simulation_type,
        challenge_id: request.challenge_id,
        quiz_id: request.quiz_id,
        title: request.title.clone(),
        participant_name: request.participant_name.clone(),
        ai_challenge: request.ai_challenge.clone(),
    };

    if request.completed {
        let score = resolve_score(&state, &request).await?;
        let steps: Vec<TraversalStep> = request
            .steps
            .iter()
            .map(|s| TraversalStep {
                node_id: s.node_id.clone(),
                action: s.action.clone(),
                score_impact: s.score_impact,
                next_node: s.next_node.clone(),
                timestamp: state.clock.now(),
            })
            .collect();
        verify_posted_steps(&state, request.challenge_id, &[], 100, &steps).await?;
        let command = SubmitCompletedRun {
            start,
            steps,
            answers: answers_as_pairs(&request.answers),
            score,
            result: request.result,
        };
        command_handlers::handle_submit_completed_run(
            &command,
            state.clock.as_ref(),
            &*state.event_repository,
        )
        .await?;
        info!(%run_id, score, "completed run submitted");
    } else {
        command_handlers::handle_start_run(&start, state.clock.as_ref(), &*state.event_repository)
            .await?;
        info!(%run_id, "run started");
    }

    let view = query_handlers::get_run_by_id(run_id, &*state.event_repository).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/simulations
async fn list(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<Vec<RunView>>, ApiError> {
    let views = query_handlers::list_runs(&*state.event_repository).await?;
    Ok(Json(views))
}

/// GET /api/simulations/{id}
async fn get_by_id(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<RunView>, ApiError> {
    let view = query_handlers::get_run_by_id(id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// PUT /api/simulations/{id}
#[instrument(skip(state, request), fields(run_id = %id))]
async fn update(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRunRequest>,
) -> Result<Json<RunView>, ApiError> {
    let view = query_handlers::get_run_by_id(id, &*state.event_repository).await?;
    let correlation_id = Uuid::new_v4();

    let new_steps: Vec<TraversalStep> = request
        .steps
        .iter()
        .skip(view.steps.len())
        .map(|s| TraversalStep {
            node_id: s.node_id.clone(),
            action: s.action.clone(),
            score_impact: s.score_impact,
            next_node: s.next_node.clone(),
            timestamp: state.clock.now(),
        })
        .collect();
    verify_posted_steps(&state, view.challenge_id, &view.steps, view.score, &new_steps).await?;

    for step in &new_steps {
        let command = RecordChoice {
            correlation_id,
            run_id: id,
            node_id: step.node_id.clone(),
            action: step.action.clone(),
            score_impact: step.score_impact,
            next_node: step.next_node.clone(),
        };
        command_handlers::handle_record_choice(
            &command,
            state.clock.as_ref(),
            &*state.event_repository,
        )
        .await?;
    }

    for injection in request.adaptive.iter().skip(view.adaptive_injections.len()) {
        let command = RecordAdaptive {
            correlation_id,
            run_id: id,
            node_id: injection.node_id.clone(),
            replaced_node: injection.replaced_node.clone(),
            message: injection.message.clone(),
            tactics_used: injection.tactics_used.clone(),
        };
        command_handlers::handle_record_adaptive(
            &command,
            state.clock.as_ref(),
            &*state.event_repository,
        )
        .await?;
    }

    for answer in request.answers.iter().skip(view.answers.len()) {
        let command = RecordQuizAnswer {
            correlation_id,
            run_id: id,
            question_id: answer.question_id.clone(),
            answer_index: answer.answer_index,
        };
        command_handlers::handle_record_quiz_answer(
            &command,
            state.clock.as_ref(),
            &*state.event_repository,
        )
        .await?;
    }

    if request.completed {
        let current = query_handlers::get_run_by_id(id, &*state.event_repository).await?;
        let command = CompleteRun {
            correlation_id,
            run_id: id,
            score: request.score.unwrap_or(current.score),
            result: request.result,
        };
        command_handlers::handle_complete_run(
            &command,
            state.clock.as_ref(),
            &*state.event_repository,
        )
        .await?;
        info!(run_id = %id, "run completed");
    }

    let view = query_handlers::get_run_by_id(id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// DELETE /api/simulations/{id}
#[instrument(skip(state), fields(run_id = %id))]
async fn delete(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = DeleteRun {
        correlation_id: Uuid::new_v4(),
        run_id: id,
    };
    command_handlers::handle_delete_run(&command, state.clock.as_ref(), &*state.event_repository)
        .await?;
    info!(run_id = %id, "run deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the simulation run router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
}
