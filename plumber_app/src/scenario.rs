use serde::{Deserialize, Serialize};
use std::path::Path;

use plumber_flow::navigation::Screen;
use plumber_flow::records::RecordCategory;
use plumber_flow::tracker::JobStatus;
use plumber_flow::CostCategory;

const WALKTHROUGH: &str = include_str!("../scenarios/walkthrough.json");

/// One user interaction, replayed against whatever screen is current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum Step {
    Navigate { screen: Screen },
    SetStatus { status: JobStatus },
    AddCost {
        description: String,
        amount: f64,
        #[serde(default)]
        category: CostCategory,
    },
    /// Costs are addressed by position, ids are generated at runtime.
    EditCost {
        index: usize,
        description: String,
        amount: f64,
        #[serde(default)]
        category: CostCategory,
    },
    RemoveCost { index: usize },
    SetNotes { notes: String },
    Submit,
    RequestApproval,
    CancelApproval,
    ConfirmApproval,
    ReportIssue { reason: String },
    SelectTab { tab: RecordCategory },
    OpenJob { id: String, category: RecordCategory },
    Revise,
    ConfirmRevise,
    CancelRevise,
    Back,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Navigate { .. } => "navigate",
            Step::SetStatus { .. } => "set-status",
            Step::AddCost { .. } => "add-cost",
            Step::EditCost { .. } => "edit-cost",
            Step::RemoveCost { .. } => "remove-cost",
            Step::SetNotes { .. } => "set-notes",
            Step::Submit => "submit",
            Step::RequestApproval => "request-approval",
            Step::CancelApproval => "cancel-approval",
            Step::ConfirmApproval => "confirm-approval",
            Step::ReportIssue { .. } => "report-issue",
            Step::SelectTab { .. } => "select-tab",
            Step::OpenJob { .. } => "open-job",
            Step::Revise => "revise",
            Step::ConfirmRevise => "confirm-revise",
            Step::CancelRevise => "cancel-revise",
            Step::Back => "back",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn walkthrough() -> Result<Self, serde_json::Error> {
        serde_json::from_str(WALKTHROUGH)
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_parses() {
        let scenario = Scenario::walkthrough().unwrap();
        assert!(!scenario.steps.is_empty());
        assert_eq!(
            scenario.steps[0],
            Step::Navigate {
                screen: Screen::QuoteBroadcast
            }
        );
    }

    #[test]
    fn steps_use_kebab_case_tags() {
        let step: Step = serde_json::from_str(
            r#"{"step": "add-cost", "description": "P-trap", "amount": 40}"#,
        )
        .unwrap();
        assert_eq!(
            step,
            Step::AddCost {
                description: "P-trap".into(),
                amount: 40.0,
                category: CostCategory::Parts
            }
        );
        let step: Step =
            serde_json::from_str(r#"{"step": "set-status", "status": "on-the-way"}"#).unwrap();
        assert_eq!(step.name(), "set-status");
    }
}
