use plumber_flow::navigation::{Navigation, Navigator, Screen};
use plumber_flow::tracker::{JobStatusTracker, JobSubmitted, Submission};
use plumber_flow::CostId;

use super::StepError;
use crate::scenario::Step;

fn cost_at(tracker: &JobStatusTracker, index: usize) -> Result<CostId, StepError> {
    tracker
        .ledger()
        .entries()
        .get(index)
        .map(|cost| cost.id)
        .ok_or(StepError::NoSuchCost(index))
}

/// Steps offered by the job tracker. `None` when the step belongs elsewhere.
pub fn handle(
    tracker: &mut JobStatusTracker,
    step: &Step,
    navigator: &dyn Navigator,
) -> Option<Result<Option<Submission>, StepError>> {
    let result = match step {
        Step::SetStatus { status } => tracker.set_status(*status).map(|_| None).map_err(Into::into),
        Step::AddCost {
            description,
            amount,
            category,
        } => tracker
            .add_cost(description, *amount, *category)
            .map(|_| None)
            .map_err(Into::into),
        Step::EditCost {
            index,
            description,
            amount,
            category,
        } => cost_at(tracker, *index).and_then(|id| {
            tracker
                .edit_cost(id, description, *amount, *category)
                .map(|_| None)
                .map_err(Into::into)
        }),
        Step::RemoveCost { index } => cost_at(tracker, *index).and_then(|id| {
            tracker.remove_cost(id).map(|_| None).map_err(Into::into)
        }),
        Step::SetNotes { notes } => tracker.set_notes(notes).map(|_| None).map_err(Into::into),
        Step::Submit => tracker.submit(navigator).map(Some).map_err(Into::into),
        Step::Back => {
            navigator.navigate(Navigation::to(Screen::PlumberHome));
            Ok(None)
        }
        _ => return None,
    };
    Some(result)
}

/// The submitted screen only offers the way home.
pub fn submitted(
    view: &JobSubmitted,
    step: &Step,
    navigator: &dyn Navigator,
) -> Option<Result<(), StepError>> {
    match step {
        Step::Back => {
            view.back(navigator);
            Some(Ok(()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumber_flow::tracker::JobStatus;
    use plumber_flow::{CostCategory, FlowError};
    use tokio::sync::mpsc;

    fn add(description: &str, amount: f64) -> Step {
        Step::AddCost {
            description: description.into(),
            amount,
            category: CostCategory::Parts,
        }
    }

    #[test]
    fn costs_are_addressed_by_position() {
        let (tx, _rx) = mpsc::unbounded_channel::<Navigation>();
        let mut tracker = JobStatusTracker::new(68.0);
        handle(&mut tracker, &add("Wax ring", 8.0), &tx).unwrap().unwrap();
        handle(&mut tracker, &add("Supply line", 12.0), &tx).unwrap().unwrap();

        let remove = Step::RemoveCost { index: 0 };
        handle(&mut tracker, &remove, &tx).unwrap().unwrap();
        assert_eq!(tracker.ledger().len(), 1);
        assert_eq!(tracker.total_payout(), 80.0);

        let err = handle(&mut tracker, &Step::RemoveCost { index: 3 }, &tx)
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, StepError::NoSuchCost(3)));
    }

    #[test]
    fn submit_hands_back_the_submission() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Navigation>();
        let mut tracker = JobStatusTracker::new(68.0);

        let err = handle(&mut tracker, &Step::Submit, &tx).unwrap().unwrap_err();
        assert!(matches!(
            err,
            StepError::Flow(FlowError::NotCompleted(JobStatus::OnTheWay))
        ));

        let done = Step::SetStatus {
            status: JobStatus::Completed,
        };
        handle(&mut tracker, &done, &tx).unwrap().unwrap();
        let submission = handle(&mut tracker, &Step::Submit, &tx)
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(submission.payout.total, 68.0);
        assert_eq!(rx.try_recv().unwrap().screen, Screen::PlumberJobSubmitted);
    }

    #[test]
    fn submitted_screen_goes_back_home() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Navigation>();
        let view = JobSubmitted::new(None);
        submitted(&view, &Step::Back, &tx).unwrap().unwrap();
        assert_eq!(rx.try_recv().unwrap().screen, Screen::PlumberHome);
        assert!(submitted(&view, &Step::Submit, &tx).is_none());
    }

    #[test]
    fn other_screens_steps_are_not_taken() {
        let (tx, _rx) = mpsc::unbounded_channel::<Navigation>();
        let mut tracker = JobStatusTracker::new(68.0);
        assert!(handle(&mut tracker, &Step::ConfirmApproval, &tx).is_none());
    }
}
