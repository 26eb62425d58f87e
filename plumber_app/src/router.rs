use std::sync::Arc;

use tracing::{info, warn};

use plumber_flow::approval::JobApproval;
use plumber_flow::broadcast::{nearby_plumbers, BroadcastSimulation};
use plumber_flow::details::JobDetails;
use plumber_flow::history::JobHistory;
use plumber_flow::navigation::{Navigation, Navigator, Screen};
use plumber_flow::records::RecordCategory;
use plumber_flow::tracker::{JobStatusTracker, JobSubmitted};
use plumber_flow::{CostCategory, ExtraCost};

use crate::state::{AppState, View};

/// Costs shown on the approval screen when no submission was made this session.
pub fn sample_costs() -> Vec<ExtraCost> {
    vec![
        ExtraCost::new("Replacement flapper valve", 15.0, CostCategory::Parts),
        ExtraCost::new("Additional labor - pipe adjustment", 25.0, CostCategory::Labor),
    ]
}

impl AppState {
    /// Drains what views emitted since the last call and mounts every screen
    /// navigated to, in order. The broadcast screen runs to completion here.
    pub async fn settle(&mut self) {
        loop {
            while let Ok(notification) = self.notify_rx.try_recv() {
                self.notifications.push(notification);
            }
            match self.nav_rx.try_recv() {
                Ok(navigation) => self.enter(navigation).await,
                Err(_) => break,
            }
        }
    }

    async fn enter(&mut self, navigation: Navigation) {
        info!(from = %self.screen, to = %navigation.screen, "screen change");
        self.screen = navigation.screen;
        self.trail.push(navigation.clone());

        self.view = match navigation.screen {
            Screen::PlumberJobTracker => {
                let mut tracker = JobStatusTracker::new(self.config.base_fee)
                    .with_policy(self.policy.clone());
                if let Some(job) = navigation.job {
                    tracker = tracker.for_job(job);
                }
                info!(job = ?tracker.job(), "tracker mounted");
                View::Tracker(tracker)
            }
            Screen::PlumberJobSubmitted => {
                View::Submitted(JobSubmitted::new(self.last_submission.clone()))
            }
            Screen::JobApproval => {
                let approval = match &self.last_submission {
                    Some(submission) => {
                        JobApproval::from_submission(submission, self.config.approval_delay)
                    }
                    None => JobApproval::new(
                        self.config.base_fee,
                        sample_costs(),
                        self.config.approval_delay,
                    ),
                };
                View::Approval(approval)
            }
            Screen::PlumberJobHistory => View::History(JobHistory::load(self.repo.as_ref()).await),
            Screen::PlumberJobDetails => {
                let (category, id) = match &navigation.job {
                    Some(job) => (job.category, Some(job.id.as_str())),
                    None => (RecordCategory::Completed, None),
                };
                let view = JobDetails::load(self.repo.as_ref(), category, id).await;
                if !view.is_found() {
                    warn!(%category, ?id, "job record not found");
                }
                View::Details(view)
            }
            Screen::QuoteBroadcast => {
                let navigator: Arc<dyn Navigator> = Arc::new(self.nav_tx.clone());
                let mut simulation = BroadcastSimulation::start(
                    nearby_plumbers(),
                    self.config.broadcast,
                    navigator,
                );
                self.broadcast = Some(simulation.finished().await);
                View::Idle
            }
            Screen::PlumberHome | Screen::Jobs => View::Idle,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumber_flow::config::FlowConfig;
    use plumber_flow::records::FixtureRepository;
    use plumber_flow::tracker::TransitionPolicy;

    fn app() -> AppState {
        AppState::new(
            FlowConfig::default(),
            TransitionPolicy::Open,
            Arc::new(FixtureRepository::bundled().unwrap()),
        )
    }

    #[tokio::test]
    async fn approval_without_submission_shows_sample_costs() {
        let mut app = app();
        app.nav_tx.navigate(Navigation::to(Screen::JobApproval));
        app.settle().await;

        assert_eq!(app.screen, Screen::JobApproval);
        match &app.view {
            View::Approval(approval) => {
                let descriptions: Vec<_> =
                    approval.costs().iter().map(|c| c.description.as_str()).collect();
                assert_eq!(
                    descriptions,
                    vec!["Replacement flapper valve", "Additional labor - pipe adjustment"]
                );
                assert_eq!(approval.breakdown().total, 108.0);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test]
    async fn details_without_a_job_opens_first_completed_record() {
        let mut app = app();
        app.nav_tx.navigate(Navigation::to(Screen::PlumberJobDetails));
        app.settle().await;

        match &app.view {
            View::Details(view) => {
                let details = view.details().unwrap();
                assert_eq!(details.record().id(), "cj1");
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn broadcast_runs_through_to_jobs() {
        let mut app = app();
        app.nav_tx.navigate(Navigation::to(Screen::QuoteBroadcast));
        app.settle().await;

        assert_eq!(app.screen, Screen::Jobs);
        let snapshot = app.broadcast.as_ref().unwrap();
        assert!(snapshot.finished);
        assert_eq!(snapshot.notified, 8);
        let screens: Vec<Screen> = app.trail.iter().map(|n| n.screen).collect();
        assert_eq!(screens, vec![Screen::QuoteBroadcast, Screen::Jobs]);
    }
}
