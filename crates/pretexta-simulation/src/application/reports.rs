//! Susceptibility reports built from a run's event history.

use chrono::{DateTime, Utc};
use pretexta_content::scenario::EndResult;
use pretexta_core::clock::Clock;
use pretexta_core::error::DomainError;
use pretexta_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::query_handlers::{self, RunView};
use crate::domain::events::{SimulationType, TraversalStep};

/// Per-run susceptibility report, exported as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SusceptibilityReport {
    /// The run the report describes.
    pub run_id: Uuid,
    /// Display title of the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Participant the report is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    /// Kind of activity.
    pub simulation_type: SimulationType,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Final (or latest) susceptibility score, `0..=100`.
    pub score: i32,
    /// Outcome, when the run ended on a scenario end node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EndResult>,
    /// Choice-level breakdown.
    pub breakdown: ReportBreakdown,
    /// The full traversal, for audit.
    pub steps: Vec<TraversalStep>,
}

/// Aggregated numbers over the recorded choices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBreakdown {
    /// Total events in the run's stream.
    pub total_events: i64,
    /// Choices with a negative score impact.
    pub risky_choices: usize,
    /// Choices with a non-negative score impact.
    pub safe_choices: usize,
    /// Share of choices that complied with the attacker, `0.0..=1.0`.
    /// Zero when no choices were recorded.
    pub compliance_rate: f64,
}

fn breakdown(view: &RunView) -> ReportBreakdown {
    let risky = view.steps.iter().filter(|s| s.score_impact < 0).count();
    let total = view.steps.len();
    #[allow(clippy::cast_precision_loss)]
    let compliance_rate = if total == 0 {
        0.0
    } else {
        risky as f64 / total as f64
    };
    ReportBreakdown {
        total_events: view.version,
        risky_choices: risky,
        safe_choices: total - risky,
        compliance_rate,
    }
}

/// Builds the susceptibility report for a run.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn build_report(
    run_id: Uuid,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SusceptibilityReport, DomainError> {
    let view = query_handlers::get_run_by_id(run_id, repo).await?;
    let breakdown = breakdown(&view);
    Ok(SusceptibilityReport {
        run_id,
        title: view.title,
        participant_name: view.participant_name,
        simulation_type: view.simulation_type,
        generated_at: clock.now(),
        score: view.score,
        result: view.result,
        breakdown,
        steps: view.steps,
    })
}
