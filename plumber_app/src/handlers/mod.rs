pub mod approval;
pub mod records;
pub mod tracker;

use thiserror::Error;
use tracing::debug;

use plumber_flow::navigation::{Navigation, Navigator, Screen};
use plumber_flow::FlowError;

use crate::scenario::Step;
use crate::state::{AppState, View};

#[derive(Debug, Error)]
pub enum StepError {
    #[error("`{step}` is not available on {screen}")]
    WrongScreen { step: &'static str, screen: Screen },

    #[error("no extra cost at position {0}")]
    NoSuchCost(usize),

    #[error(transparent)]
    Flow(#[from] FlowError),
}

/// Applies one step to the mounted view. Navigation it causes is picked up by
/// the next `settle`.
pub async fn dispatch(state: &mut AppState, step: &Step) -> Result<(), StepError> {
    debug!(step = step.name(), screen = %state.screen, "dispatch");
    let wrong_screen = StepError::WrongScreen {
        step: step.name(),
        screen: state.screen,
    };

    if let Step::Navigate { screen } = step {
        state.nav_tx.navigate(Navigation::to(*screen));
        return Ok(());
    }

    match &mut state.view {
        View::Tracker(view) => {
            if let Some(submission) = tracker::handle(view, step, &state.nav_tx)
                .ok_or(wrong_screen)??
            {
                state.last_submission = Some(submission);
            }
            Ok(())
        }
        View::Submitted(view) => tracker::submitted(view, step, &state.nav_tx).ok_or(wrong_screen)?,
        View::Approval(view) => {
            approval::handle(view, step, &state.notify_tx, &state.nav_tx)
                .await
                .ok_or(wrong_screen)?
        }
        View::History(view) => records::history(view, step, &state.nav_tx).ok_or(wrong_screen)?,
        View::Details(view) => records::details(view, step, &state.nav_tx).ok_or(wrong_screen)?,
        View::Idle => Err(wrong_screen),
    }
}
