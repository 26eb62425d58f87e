//! Plumber job history: three buckets of past work.

use serde::Serialize;

use crate::error::{FlowError, Result};
use crate::navigation::{JobRef, Navigation, Navigator, Screen};
use crate::records::{JobRecord, JobRepository, RecordCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub pending_approval: usize,
    pub completed: usize,
    pub not_selected: usize,
}

#[derive(Debug, Clone)]
pub struct JobHistory {
    pending_approval: Vec<JobRecord>,
    completed: Vec<JobRecord>,
    not_selected: Vec<JobRecord>,
    active_tab: RecordCategory,
}

impl JobHistory {
    pub async fn load(repo: &dyn JobRepository) -> Self {
        Self {
            pending_approval: repo.list(RecordCategory::PendingApproval).await,
            completed: repo.list(RecordCategory::Completed).await,
            not_selected: repo.list(RecordCategory::NotSelected).await,
            active_tab: RecordCategory::PendingApproval,
        }
    }

    pub fn active_tab(&self) -> RecordCategory {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: RecordCategory) {
        self.active_tab = tab;
    }

    pub fn bucket(&self, category: RecordCategory) -> &[JobRecord] {
        match category {
            RecordCategory::PendingApproval => &self.pending_approval,
            RecordCategory::Completed => &self.completed,
            RecordCategory::NotSelected => &self.not_selected,
        }
    }

    /// Records shown under the active tab.
    pub fn entries(&self) -> &[JobRecord] {
        self.bucket(self.active_tab)
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            pending_approval: self.pending_approval.len(),
            completed: self.completed.len(),
            not_selected: self.not_selected.len(),
        }
    }

    /// Mean amount by which declined quotes exceeded the winning quote,
    /// rounded to whole dollars.
    pub fn average_quote_gap(&self) -> Option<f64> {
        let gaps: Vec<f64> = self
            .not_selected
            .iter()
            .filter_map(|r| match r {
                JobRecord::NotSelected(q) => Some(q.your_quote - q.selected_quote),
                _ => None,
            })
            .collect();
        if gaps.is_empty() {
            return None;
        }
        Some((gaps.iter().sum::<f64>() / gaps.len() as f64).round())
    }

    /// Opens the details screen for one record of a bucket.
    pub fn open(&self, id: &str, category: RecordCategory, navigator: &dyn Navigator) -> Result<()> {
        if !self.bucket(category).iter().any(|r| r.id() == id) {
            return Err(FlowError::RecordNotFound {
                category,
                id: id.to_string(),
            });
        }
        navigator.navigate(Navigation::with_job(
            Screen::PlumberJobDetails,
            JobRef::new(id, category),
        ));
        Ok(())
    }

    pub fn back(&self, navigator: &dyn Navigator) {
        navigator.navigate(Navigation::to(Screen::PlumberHome));
    }
}
