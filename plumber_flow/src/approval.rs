//! Customer review of a submitted job: approve and release, or report an issue.

use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::error::{FlowError, Result};
use crate::navigation::{Navigation, Navigator, Screen};
use crate::notify::{Notification, Notifier};
use crate::tracker::Submission;
use crate::{format_usd, ExtraCost, PayoutBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalState {
    Reviewing,
    Confirming,
    Approved,
    IssueReported,
}

#[derive(Debug, Clone)]
pub struct JobApproval {
    base_fee: f64,
    costs: Vec<ExtraCost>,
    display_delay: Duration,
    state: ApprovalState,
}

pub fn can_report(reason: &str) -> bool {
    !reason.trim().is_empty()
}

impl JobApproval {
    pub fn new(base_fee: f64, costs: Vec<ExtraCost>, display_delay: Duration) -> Self {
        Self {
            base_fee,
            costs,
            display_delay,
            state: ApprovalState::Reviewing,
        }
    }

    pub fn from_submission(submission: &Submission, display_delay: Duration) -> Self {
        Self::new(submission.payout.base_fee, submission.costs.clone(), display_delay)
    }

    pub fn state(&self) -> ApprovalState {
        self.state
    }

    pub fn costs(&self) -> &[ExtraCost] {
        &self.costs
    }

    pub fn breakdown(&self) -> PayoutBreakdown {
        PayoutBreakdown::compute(self.base_fee, &self.costs)
    }

    fn ensure_undecided(&self) -> Result<()> {
        match self.state {
            ApprovalState::Approved | ApprovalState::IssueReported => Err(FlowError::AlreadyDecided),
            _ => Ok(()),
        }
    }

    /// Opens the confirmation prompt.
    pub fn request_approval(&mut self) -> Result<()> {
        self.ensure_undecided()?;
        self.state = ApprovalState::Confirming;
        Ok(())
    }

    pub fn cancel_approval(&mut self) {
        if self.state == ApprovalState::Confirming {
            self.state = ApprovalState::Reviewing;
        }
    }

    pub async fn confirm_approval(
        &mut self,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> Result<()> {
        self.ensure_undecided()?;
        if self.state != ApprovalState::Confirming {
            return Err(FlowError::ConfirmationRequired);
        }
        self.state = ApprovalState::Approved;

        let total = self.breakdown().total;
        info!(total, "work approved, releasing payment");
        notifier.notify(Notification::success(
            "Work Approved!",
            format!(
                "Payment of {} has been released to your plumber.",
                format_usd(total)
            ),
        ));
        tokio::time::sleep(self.display_delay).await;
        navigator.navigate(Navigation::to(Screen::Jobs));
        Ok(())
    }

    pub async fn report_issue(
        &mut self,
        reason: &str,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> Result<()> {
        self.ensure_undecided()?;
        if !can_report(reason) {
            return Err(FlowError::EmptyReason);
        }
        self.state = ApprovalState::IssueReported;

        info!(reason = reason.trim(), "issue reported on completed work");
        notifier.notify(Notification::info(
            "Issue Reported",
            "Your feedback has been sent to the plumber and our support team.",
        ));
        tokio::time::sleep(self.display_delay).await;
        navigator.navigate(Navigation::to(Screen::Jobs));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;
    use crate::CostCategory;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    fn sample() -> JobApproval {
        JobApproval::new(
            68.0,
            vec![
                ExtraCost::new("Replacement flapper valve", 15.0, CostCategory::Parts),
                ExtraCost::new("Additional labor - pipe adjustment", 25.0, CostCategory::Labor),
            ],
            Duration::from_millis(500),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn approval_needs_confirmation_first() {
        let (nav_tx, mut nav_rx) = mpsc::unbounded_channel::<Navigation>();
        let (note_tx, mut note_rx) = mpsc::unbounded_channel::<Notification>();
        let mut approval = sample();

        assert_eq!(
            approval.confirm_approval(&note_tx, &nav_tx).await,
            Err(FlowError::ConfirmationRequired)
        );
        assert!(note_rx.try_recv().is_err());
        assert!(nav_rx.try_recv().is_err());

        approval.request_approval().unwrap();
        approval.cancel_approval();
        assert_eq!(approval.state(), ApprovalState::Reviewing);
        assert!(approval.confirm_approval(&note_tx, &nav_tx).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_approval_notifies_then_navigates_after_delay() {
        let (nav_tx, mut nav_rx) = mpsc::unbounded_channel::<Navigation>();
        let (note_tx, mut note_rx) = mpsc::unbounded_channel::<Notification>();
        let mut approval = sample();

        approval.request_approval().unwrap();
        let started = Instant::now();
        approval.confirm_approval(&note_tx, &nav_tx).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));

        let note = note_rx.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.title, "Work Approved!");
        assert_eq!(
            note.description,
            "Payment of $108.00 has been released to your plumber."
        );
        assert_eq!(nav_rx.try_recv().unwrap().screen, Screen::Jobs);
        assert_eq!(approval.state(), ApprovalState::Approved);
        assert_eq!(approval.request_approval(), Err(FlowError::AlreadyDecided));
    }

    #[tokio::test(start_paused = true)]
    async fn report_needs_a_reason() {
        let (nav_tx, mut nav_rx) = mpsc::unbounded_channel::<Navigation>();
        let (note_tx, mut note_rx) = mpsc::unbounded_channel::<Notification>();
        let mut approval = sample();

        assert!(!can_report("   "));
        assert_eq!(
            approval.report_issue("  ", &note_tx, &nav_tx).await,
            Err(FlowError::EmptyReason)
        );
        assert!(note_rx.try_recv().is_err());
        assert_eq!(approval.state(), ApprovalState::Reviewing);

        approval
            .report_issue("Toilet still runs after flushing", &note_tx, &nav_tx)
            .await
            .unwrap();
        let note = note_rx.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Info);
        assert_eq!(note.title, "Issue Reported");
        assert_eq!(nav_rx.try_recv().unwrap().screen, Screen::Jobs);
        assert_eq!(approval.state(), ApprovalState::IssueReported);
    }

    #[test]
    fn breakdown_matches_costs() {
        let approval = sample();
        let breakdown = approval.breakdown();
        assert_eq!(breakdown.base_fee, 68.0);
        assert_eq!(breakdown.extras, 40.0);
        assert_eq!(breakdown.total, 108.0);
    }
}
