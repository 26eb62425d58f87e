//! Job history records and the repository views read them through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::error::Result;

const BUNDLED_FIXTURES: &str = include_str!("../fixtures/job_records.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordCategory {
    Completed,
    PendingApproval,
    NotSelected,
}

impl RecordCategory {
    pub const ALL: [RecordCategory; 3] = [
        RecordCategory::PendingApproval,
        RecordCategory::Completed,
        RecordCategory::NotSelected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::Completed => "completed",
            RecordCategory::PendingApproval => "pending-approval",
            RecordCategory::NotSelected => "not-selected",
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    /// Where on the property, e.g. "Kitchen, Main Floor".
    pub place: String,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedJob {
    pub id: String,
    pub issue_type: String,
    pub customer: Customer,
    pub location: Location,
    pub requested_at: String,
    pub accepted_at: String,
    pub arrived_at: String,
    pub completed_at: String,
    pub duration: String,
    pub quoted_amount: f64,
    pub final_amount: f64,
    pub payout: f64,
    pub payment_method: String,
    pub rating: f32,
    pub review: String,
    pub description: String,
    pub work_performed: String,
    #[serde(default)]
    pub parts_used: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingApprovalJob {
    pub id: String,
    pub issue_type: String,
    pub customer: Customer,
    pub location: Location,
    pub requested_at: String,
    pub accepted_at: String,
    pub arrived_at: String,
    pub completed_at: String,
    pub submitted_at: String,
    pub duration: String,
    pub quoted_amount: f64,
    pub extra_costs: f64,
    #[serde(default)]
    pub extra_costs_description: Option<String>,
    pub final_amount: f64,
    pub expected_payout: f64,
    pub description: String,
    pub work_performed: String,
    #[serde(default)]
    pub parts_used: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotSelectedJob {
    pub id: String,
    pub issue_type: String,
    pub customer: Customer,
    pub location: Location,
    pub requested_at: String,
    pub quoted_at: String,
    pub declined_at: String,
    pub response_time: String,
    pub your_quote: f64,
    pub selected_quote: f64,
    pub quote_difference: f64,
    pub number_of_quotes: u32,
    pub your_ranking: u32,
    pub reason: String,
    pub feedback: String,
    pub description: String,
    pub urgency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum JobRecord {
    Completed(CompletedJob),
    PendingApproval(PendingApprovalJob),
    NotSelected(NotSelectedJob),
}

impl JobRecord {
    pub fn id(&self) -> &str {
        match self {
            JobRecord::Completed(j) => &j.id,
            JobRecord::PendingApproval(j) => &j.id,
            JobRecord::NotSelected(j) => &j.id,
        }
    }

    pub fn category(&self) -> RecordCategory {
        match self {
            JobRecord::Completed(_) => RecordCategory::Completed,
            JobRecord::PendingApproval(_) => RecordCategory::PendingApproval,
            JobRecord::NotSelected(_) => RecordCategory::NotSelected,
        }
    }

    pub fn issue_type(&self) -> &str {
        match self {
            JobRecord::Completed(j) => &j.issue_type,
            JobRecord::PendingApproval(j) => &j.issue_type,
            JobRecord::NotSelected(j) => &j.issue_type,
        }
    }

    pub fn customer(&self) -> &Customer {
        match self {
            JobRecord::Completed(j) => &j.customer,
            JobRecord::PendingApproval(j) => &j.customer,
            JobRecord::NotSelected(j) => &j.customer,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            JobRecord::Completed(j) => &j.location,
            JobRecord::PendingApproval(j) => &j.location,
            JobRecord::NotSelected(j) => &j.location,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            JobRecord::Completed(j) => &j.description,
            JobRecord::PendingApproval(j) => &j.description,
            JobRecord::NotSelected(j) => &j.description,
        }
    }
}

/// Source of job history records.
///
/// `find` with no id falls back to the first record of the category, in
/// insertion order. Absence is `None`, never an error.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn list(&self, category: RecordCategory) -> Vec<JobRecord>;

    async fn find(&self, category: RecordCategory, id: Option<&str>) -> Option<JobRecord> {
        let mut records = self.list(category).await.into_iter();
        match id {
            Some(id) => records.find(|r| r.id() == id),
            None => records.next(),
        }
    }
}

/// Records held in memory, grouped per category in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureRepository {
    #[serde(default)]
    pub completed: Vec<CompletedJob>,
    #[serde(default)]
    pub pending_approval: Vec<PendingApprovalJob>,
    #[serde(default)]
    pub not_selected: Vec<NotSelectedJob>,
}

impl FixtureRepository {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The records shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_FIXTURES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let repo = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            completed = repo.completed.len(),
            pending = repo.pending_approval.len(),
            not_selected = repo.not_selected.len(),
            "loaded job records"
        );
        Ok(repo)
    }

    fn records(&self, category: RecordCategory) -> Vec<JobRecord> {
        match category {
            RecordCategory::Completed => self
                .completed
                .iter()
                .cloned()
                .map(JobRecord::Completed)
                .collect(),
            RecordCategory::PendingApproval => self
                .pending_approval
                .iter()
                .cloned()
                .map(JobRecord::PendingApproval)
                .collect(),
            RecordCategory::NotSelected => self
                .not_selected
                .iter()
                .cloned()
                .map(JobRecord::NotSelected)
                .collect(),
        }
    }
}

#[async_trait]
impl JobRepository for FixtureRepository {
    async fn list(&self, category: RecordCategory) -> Vec<JobRecord> {
        self.records(category)
    }

    async fn find(&self, category: RecordCategory, id: Option<&str>) -> Option<JobRecord> {
        fn pick<'a, T>(items: &'a [T], id: Option<&str>, key: impl Fn(&T) -> &str) -> Option<&'a T> {
            match id {
                Some(id) => items.iter().find(|item| key(item) == id),
                None => items.first(),
            }
        }

        match category {
            RecordCategory::Completed => pick(&self.completed, id, |j| j.id.as_str())
                .cloned()
                .map(JobRecord::Completed),
            RecordCategory::PendingApproval => pick(&self.pending_approval, id, |j| j.id.as_str())
                .cloned()
                .map(JobRecord::PendingApproval),
            RecordCategory::NotSelected => pick(&self.not_selected, id, |j| j.id.as_str())
                .cloned()
                .map(JobRecord::NotSelected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_completed_record_by_id() {
        let repo = FixtureRepository::bundled().unwrap();
        let record = repo.find(RecordCategory::Completed, Some("cj1")).await.unwrap();
        assert_eq!(record.issue_type(), "Drain Cleaning");
        match record {
            JobRecord::Completed(job) => assert_eq!(job.payout, 95.0),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let repo = FixtureRepository::bundled().unwrap();
        assert!(repo.find(RecordCategory::Completed, Some("nope")).await.is_none());
        // ids do not leak across categories
        assert!(repo.find(RecordCategory::NotSelected, Some("cj1")).await.is_none());
    }

    #[tokio::test]
    async fn missing_id_falls_back_to_first_record() {
        let repo = FixtureRepository::bundled().unwrap();
        let first = repo.find(RecordCategory::PendingApproval, None).await.unwrap();
        assert_eq!(first.id(), "pa1");
        let first = repo.find(RecordCategory::NotSelected, None).await.unwrap();
        assert_eq!(first.id(), "dq1");
    }

    #[tokio::test]
    async fn empty_repository_finds_nothing() {
        let repo = FixtureRepository::empty();
        for category in RecordCategory::ALL {
            assert!(repo.find(category, None).await.is_none());
            assert!(repo.list(category).await.is_empty());
        }
    }

    struct ListOnly(Vec<JobRecord>);

    #[async_trait]
    impl JobRepository for ListOnly {
        async fn list(&self, category: RecordCategory) -> Vec<JobRecord> {
            self.0
                .iter()
                .filter(|r| r.category() == category)
                .cloned()
                .collect()
        }
    }

    #[tokio::test]
    async fn default_find_goes_through_list() {
        let bundled = FixtureRepository::bundled().unwrap();
        let repo = ListOnly(bundled.list(RecordCategory::Completed).await);
        assert_eq!(
            repo.find(RecordCategory::Completed, Some("cj3")).await.unwrap().issue_type(),
            "Toilet Repair"
        );
        assert_eq!(
            repo.find(RecordCategory::Completed, None).await.unwrap().id(),
            "cj1"
        );
        assert!(repo.find(RecordCategory::PendingApproval, None).await.is_none());
    }

    #[test]
    fn records_serialize_with_their_category() {
        let repo = FixtureRepository::bundled().unwrap();
        let record = JobRecord::NotSelected(repo.not_selected[0].clone());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "not-selected");
        assert_eq!(json["id"], "dq1");
    }

    #[test]
    fn bad_fixture_json_is_a_fixture_error() {
        let err = FixtureRepository::from_json("{\"completed\": 3}").unwrap_err();
        assert!(matches!(err, crate::FlowError::Fixture(_)));
    }
}
