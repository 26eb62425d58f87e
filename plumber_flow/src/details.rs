//! Detail screen for a single history record.

use serde::Serialize;
use tracing::info;

use crate::error::{FlowError, Result};
use crate::navigation::{JobRef, Navigation, Navigator, Screen};
use crate::records::{JobRecord, JobRepository, RecordCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineStep {
    pub label: &'static str,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLine {
    pub label: &'static str,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailAction {
    BackToHistory,
    Revise,
}

#[derive(Debug, Clone)]
pub struct JobDetails {
    record: JobRecord,
    /// The "withdraw and revise?" prompt is open.
    confirming_revise: bool,
}

#[derive(Debug, Clone)]
pub enum DetailsView {
    Found(JobDetails),
    NotFound,
}

impl DetailsView {
    pub fn details(&self) -> Option<&JobDetails> {
        match self {
            DetailsView::Found(details) => Some(details),
            DetailsView::NotFound => None,
        }
    }

    pub fn details_mut(&mut self) -> Option<&mut JobDetails> {
        match self {
            DetailsView::Found(details) => Some(details),
            DetailsView::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, DetailsView::Found(_))
    }

    /// The only way out of either state.
    pub fn back(&self, navigator: &dyn Navigator) {
        navigator.navigate(Navigation::to(Screen::PlumberJobHistory));
    }
}

impl JobDetails {
    pub async fn load(
        repo: &dyn JobRepository,
        category: RecordCategory,
        id: Option<&str>,
    ) -> DetailsView {
        match repo.find(category, id).await {
            Some(record) => DetailsView::Found(JobDetails {
                record,
                confirming_revise: false,
            }),
            None => DetailsView::NotFound,
        }
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }

    pub fn category(&self) -> RecordCategory {
        self.record.category()
    }

    pub fn job_ref(&self) -> JobRef {
        JobRef::new(self.record.id(), self.category())
    }

    pub fn timeline(&self) -> Vec<TimelineStep> {
        let step = |label, at: &String| TimelineStep {
            label,
            at: at.clone(),
        };
        match &self.record {
            JobRecord::Completed(j) => vec![
                step("Requested", &j.requested_at),
                step("Accepted", &j.accepted_at),
                step("Arrived", &j.arrived_at),
                step("Completed", &j.completed_at),
            ],
            JobRecord::PendingApproval(j) => vec![
                step("Requested", &j.requested_at),
                step("Accepted", &j.accepted_at),
                step("Arrived", &j.arrived_at),
                step("Completed", &j.completed_at),
                step("Submitted for approval", &j.submitted_at),
            ],
            JobRecord::NotSelected(j) => vec![
                step("Requested", &j.requested_at),
                step("Quote submitted", &j.quoted_at),
                step("Not selected", &j.declined_at),
            ],
        }
    }

    pub fn payment_summary(&self) -> Vec<PaymentLine> {
        let line = |label, amount| PaymentLine { label, amount };
        match &self.record {
            JobRecord::Completed(j) => vec![
                line("Quoted amount", j.quoted_amount),
                line("Final amount", j.final_amount),
                line("Your payout", j.payout),
            ],
            JobRecord::PendingApproval(j) => {
                let mut lines = vec![line("Base fee", j.quoted_amount)];
                if j.extra_costs > 0.0 {
                    lines.push(line("Extra costs", j.extra_costs));
                }
                lines.push(line("Expected payout", j.expected_payout));
                lines
            }
            JobRecord::NotSelected(j) => vec![
                line("Your quote", j.your_quote),
                line("Selected quote", j.selected_quote),
                line("Price difference", j.quote_difference),
            ],
        }
    }

    pub fn actions(&self) -> Vec<DetailAction> {
        match self.category() {
            RecordCategory::PendingApproval => vec![DetailAction::BackToHistory, DetailAction::Revise],
            RecordCategory::Completed | RecordCategory::NotSelected => {
                vec![DetailAction::BackToHistory]
            }
        }
    }

    /// Returns false when the action is not offered for this record.
    ///
    /// `Revise` only opens the confirmation prompt; [`confirm_revise`]
    /// withdraws the submission and reopens the tracker.
    ///
    /// [`confirm_revise`]: JobDetails::confirm_revise
    pub fn perform(&mut self, action: DetailAction, navigator: &dyn Navigator) -> bool {
        if !self.actions().contains(&action) {
            return false;
        }
        match action {
            DetailAction::BackToHistory => {
                navigator.navigate(Navigation::to(Screen::PlumberJobHistory))
            }
            DetailAction::Revise => self.confirming_revise = true,
        }
        true
    }

    pub fn is_confirming_revise(&self) -> bool {
        self.confirming_revise
    }

    pub fn cancel_revise(&mut self) {
        self.confirming_revise = false;
    }

    pub fn confirm_revise(&mut self, navigator: &dyn Navigator) -> Result<()> {
        if !self.confirming_revise {
            return Err(FlowError::ConfirmationRequired);
        }
        self.confirming_revise = false;
        info!(id = self.record.id(), "submission withdrawn for revision");
        navigator.navigate(Navigation::with_job(
            Screen::PlumberJobTracker,
            self.job_ref(),
        ));
        Ok(())
    }
}
