use tracing::warn;

use plumber_flow::details::{DetailAction, DetailsView};
use plumber_flow::history::JobHistory;
use plumber_flow::navigation::Navigator;

use super::StepError;
use crate::scenario::Step;

pub fn history(
    view: &mut JobHistory,
    step: &Step,
    navigator: &dyn Navigator,
) -> Option<Result<(), StepError>> {
    let result = match step {
        Step::SelectTab { tab } => {
            view.select_tab(*tab);
            Ok(())
        }
        Step::OpenJob { id, category } => view.open(id, *category, navigator).map_err(Into::into),
        Step::Back => {
            view.back(navigator);
            Ok(())
        }
        _ => return None,
    };
    Some(result)
}

pub fn details(
    view: &mut DetailsView,
    step: &Step,
    navigator: &dyn Navigator,
) -> Option<Result<(), StepError>> {
    if let Step::Back = step {
        view.back(navigator);
        return Some(Ok(()));
    }
    // revise only exists on a found pending-approval record
    let details = view.details_mut()?;
    match step {
        Step::Revise => {
            if !details.perform(DetailAction::Revise, navigator) {
                warn!("revise is not offered for this record");
                return None;
            }
            Some(Ok(()))
        }
        Step::ConfirmRevise => Some(details.confirm_revise(navigator).map_err(Into::into)),
        Step::CancelRevise => {
            details.cancel_revise();
            Some(Ok(()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumber_flow::details::JobDetails;
    use plumber_flow::navigation::{Navigation, Screen};
    use plumber_flow::records::{FixtureRepository, RecordCategory};
    use plumber_flow::FlowError;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn opening_an_unknown_record_fails() {
        let repo = FixtureRepository::bundled().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel::<Navigation>();
        let mut view = JobHistory::load(&repo).await;

        let step = Step::OpenJob {
            id: "zz9".into(),
            category: RecordCategory::Completed,
        };
        let err = history(&mut view, &step, &tx).unwrap().unwrap_err();
        assert!(matches!(err, StepError::Flow(FlowError::RecordNotFound { .. })));
        assert!(rx.try_recv().is_err());

        let tab = Step::SelectTab {
            tab: RecordCategory::NotSelected,
        };
        history(&mut view, &tab, &tx).unwrap().unwrap();
        assert_eq!(view.active_tab(), RecordCategory::NotSelected);
    }

    #[tokio::test]
    async fn revise_only_on_pending_records() {
        let repo = FixtureRepository::bundled().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel::<Navigation>();

        let mut completed = JobDetails::load(&repo, RecordCategory::Completed, Some("cj1")).await;
        assert!(details(&mut completed, &Step::Revise, &tx).is_none());

        let mut pending =
            JobDetails::load(&repo, RecordCategory::PendingApproval, Some("pa1")).await;
        let err = details(&mut pending, &Step::ConfirmRevise, &tx)
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, StepError::Flow(FlowError::ConfirmationRequired)));

        details(&mut pending, &Step::Revise, &tx).unwrap().unwrap();
        assert!(rx.try_recv().is_err());
        details(&mut pending, &Step::ConfirmRevise, &tx).unwrap().unwrap();
        let navigation = rx.try_recv().unwrap();
        assert_eq!(navigation.screen, Screen::PlumberJobTracker);
        assert_eq!(navigation.job.unwrap().id, "pa1");
    }
}
