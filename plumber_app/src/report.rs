use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use plumber_flow::broadcast::BroadcastSnapshot;
use plumber_flow::history::HistorySummary;
use plumber_flow::navigation::{Navigation, Screen};
use plumber_flow::notify::Notification;
use plumber_flow::tracker::{ReceiptLine, Submission};

use crate::handlers;
use crate::scenario::Scenario;
use crate::state::{AppState, View};

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: &'static str,
    /// Screen the step was applied on.
    pub screen: Screen,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub summary: HistorySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_quote_gap: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub final_screen: Screen,
    pub steps: Vec<StepOutcome>,
    pub navigation: Vec<Navigation>,
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
    /// Payout lines as the submitted screen listed them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub receipt: Vec<ReceiptLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<BroadcastSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryReport>,
}

impl SessionReport {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}

/// Replays every step, settling navigation after each. Failed steps are
/// recorded and the run carries on.
pub async fn run(state: &mut AppState, scenario: &Scenario) -> SessionReport {
    info!(scenario = %scenario.name, steps = scenario.steps.len(), "running scenario");
    let mut steps = Vec::with_capacity(scenario.steps.len());
    let mut history = None;
    let mut receipt = Vec::new();

    for step in &scenario.steps {
        let screen = state.screen;
        let outcome = match handlers::dispatch(state, step).await {
            Ok(()) => StepOutcome {
                step: step.name(),
                screen,
                ok: true,
                error: None,
            },
            Err(e) => {
                warn!(step = step.name(), %screen, error = %e, "step rejected");
                StepOutcome {
                    step: step.name(),
                    screen,
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        };
        steps.push(outcome);
        state.settle().await;

        match &state.view {
            View::History(view) => {
                history = Some(HistoryReport {
                    summary: view.summary(),
                    average_quote_gap: view.average_quote_gap(),
                });
            }
            View::Submitted(view) => {
                info!(headline = %view.headline(), "job submitted");
                receipt = view.receipt();
            }
            _ => {}
        }
    }

    SessionReport {
        scenario: scenario.name.clone(),
        generated_at: Utc::now(),
        final_screen: state.screen,
        steps,
        navigation: state.trail.clone(),
        notifications: state.notifications.clone(),
        submission: state.last_submission.clone(),
        receipt,
        broadcast: state.broadcast.clone(),
        history,
    }
}

pub fn save_json(report: &SessionReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;
    info!(path = %path.display(), "session report written");
    Ok(())
}
