//! Plumber-side tracking of a single accepted job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::info;

use crate::error::{FlowError, Result};
use crate::ledger::ExtraCostLedger;
use crate::navigation::{JobRef, Navigation, Navigator, Screen};
use crate::{CostCategory, CostId, ExtraCost, PayoutBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Accepted,
    #[default]
    OnTheWay,
    Arrived,
    Working,
    Completed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Accepted,
        JobStatus::OnTheWay,
        JobStatus::Arrived,
        JobStatus::Working,
        JobStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Accepted => "accepted",
            JobStatus::OnTheWay => "on-the-way",
            JobStatus::Arrived => "arrived",
            JobStatus::Working => "working",
            JobStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Accepted => "Accepted",
            JobStatus::OnTheWay => "On the Way",
            JobStatus::Arrived => "Arrived on Site",
            JobStatus::Working => "Working",
            JobStatus::Completed => "Completed",
        }
    }

    pub fn next(&self) -> Option<JobStatus> {
        let idx = Self::ALL.iter().position(|s| s == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit directed map of allowed status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    allowed: HashMap<JobStatus, Vec<JobStatus>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self {
            allowed: HashMap::new(),
        }
    }

    pub fn allow(mut self, from: JobStatus, to: JobStatus) -> Self {
        let targets = self.allowed.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
        self
    }

    /// Stay put or advance one stage at a time.
    pub fn forward_only() -> Self {
        JobStatus::ALL.iter().fold(Self::new(), |table, &status| {
            let table = table.allow(status, status);
            match status.next() {
                Some(next) => table.allow(status, next),
                None => table,
            }
        })
    }

    pub fn permits(&self, from: JobStatus, to: JobStatus) -> bool {
        self.allowed
            .get(&from)
            .is_some_and(|targets| targets.contains(&to))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may follow any other.
    #[default]
    Open,
    Guarded(TransitionTable),
}

impl TransitionPolicy {
    pub fn permits(&self, from: JobStatus, to: JobStatus) -> bool {
        match self {
            TransitionPolicy::Open => true,
            TransitionPolicy::Guarded(table) => table.permits(from, to),
        }
    }
}

/// Optional sections of the tracking screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Panel {
    Navigation,
    ExtraCosts,
    PhotoUpload,
    Contact,
    Notes,
    Submit,
}

impl Panel {
    pub fn visible_for(&self, status: JobStatus) -> bool {
        use JobStatus::*;
        match self {
            Panel::Navigation => matches!(status, Accepted | OnTheWay),
            Panel::ExtraCosts | Panel::PhotoUpload => matches!(status, Arrived | Working | Completed),
            Panel::Contact | Panel::Notes => true,
            Panel::Submit => status == Completed,
        }
    }
}

const PANELS: [Panel; 6] = [
    Panel::Navigation,
    Panel::ExtraCosts,
    Panel::PhotoUpload,
    Panel::Contact,
    Panel::Notes,
    Panel::Submit,
];

/// What gets handed to the customer for approval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
    pub status: JobStatus,
    pub costs: Vec<ExtraCost>,
    pub payout: PayoutBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptLine {
    pub label: String,
    pub amount: f64,
}

/// Confirmation screen shown once a job is submitted.
#[derive(Debug, Clone)]
pub struct JobSubmitted {
    submission: Option<Submission>,
}

impl JobSubmitted {
    pub fn new(submission: Option<Submission>) -> Self {
        Self { submission }
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn headline(&self) -> String {
        match &self.submission {
            Some(s) => format!("{}, awaiting customer approval", s.status.label()),
            None => "Awaiting customer approval".to_string(),
        }
    }

    /// Expected payout, one line per extra cost between base fee and total.
    pub fn receipt(&self) -> Vec<ReceiptLine> {
        let Some(submission) = &self.submission else {
            return Vec::new();
        };
        let mut lines = vec![ReceiptLine {
            label: "Base Service Fee".to_string(),
            amount: submission.payout.base_fee,
        }];
        lines.extend(submission.costs.iter().map(|cost| ReceiptLine {
            label: format!("{} ({})", cost.description, cost.category.label()),
            amount: cost.amount,
        }));
        lines.push(ReceiptLine {
            label: "Total Payout".to_string(),
            amount: submission.payout.total,
        });
        lines
    }

    pub fn back(&self, navigator: &dyn Navigator) {
        navigator.navigate(Navigation::to(Screen::PlumberHome));
    }
}

#[derive(Debug, Clone)]
pub struct JobStatusTracker {
    job: Option<JobRef>,
    status: JobStatus,
    policy: TransitionPolicy,
    base_fee: f64,
    ledger: ExtraCostLedger,
    notes: String,
    closed: bool,
}

impl JobStatusTracker {
    pub fn new(base_fee: f64) -> Self {
        Self {
            job: None,
            status: JobStatus::default(),
            policy: TransitionPolicy::default(),
            base_fee,
            ledger: ExtraCostLedger::new(),
            notes: String::new(),
            closed: false,
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Tracks a specific record, e.g. when revising a pending submission.
    pub fn for_job(mut self, job: JobRef) -> Self {
        self.job = Some(job);
        self
    }

    pub fn job(&self) -> Option<&JobRef> {
        self.job.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(FlowError::SessionClosed);
        }
        Ok(())
    }

    /// Returns the status that was replaced.
    pub fn set_status(&mut self, status: JobStatus) -> Result<JobStatus> {
        self.ensure_open()?;
        let from = self.status;
        if !self.policy.permits(from, status) {
            return Err(FlowError::InvalidTransition { from, to: status });
        }
        self.status = status;
        info!(%from, to = %status, "job status changed");
        Ok(from)
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        panel.visible_for(self.status)
    }

    pub fn visible_panels(&self) -> Vec<Panel> {
        PANELS
            .iter()
            .copied()
            .filter(|p| p.visible_for(self.status))
            .collect()
    }

    pub fn add_cost(&mut self, description: &str, amount: f64, category: CostCategory) -> Result<CostId> {
        self.ensure_open()?;
        self.ledger.add(description, amount, category)
    }

    pub fn edit_cost(
        &mut self,
        id: CostId,
        description: &str,
        amount: f64,
        category: CostCategory,
    ) -> Result<()> {
        self.ensure_open()?;
        self.ledger.edit(id, description, amount, category)
    }

    pub fn remove_cost(&mut self, id: CostId) -> Result<Option<ExtraCost>> {
        self.ensure_open()?;
        Ok(self.ledger.remove(id))
    }

    pub fn ledger(&self) -> &ExtraCostLedger {
        &self.ledger
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<()> {
        self.ensure_open()?;
        self.notes = notes.to_string();
        Ok(())
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn payout(&self) -> PayoutBreakdown {
        PayoutBreakdown::compute(self.base_fee, self.ledger.iter())
    }

    pub fn total_payout(&self) -> f64 {
        self.payout().total
    }

    /// Closes the session and hands over to the submitted screen.
    pub fn submit(&mut self, navigator: &dyn Navigator) -> Result<Submission> {
        self.ensure_open()?;
        if self.status != JobStatus::Completed {
            return Err(FlowError::NotCompleted(self.status));
        }
        self.closed = true;

        let notes = self.notes.trim();
        let submission = Submission {
            job: self.job.clone(),
            status: self.status,
            costs: self.ledger.entries().to_vec(),
            payout: self.payout(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        };
        info!(
            total = submission.payout.total,
            extras = submission.costs.len(),
            "job submitted for approval"
        );
        navigator.navigate(Navigation::to(Screen::PlumberJobSubmitted));
        Ok(submission)
    }
}
