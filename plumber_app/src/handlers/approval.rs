use plumber_flow::approval::JobApproval;
use plumber_flow::navigation::{Navigation, Navigator, Screen};
use plumber_flow::notify::Notifier;

use super::StepError;
use crate::scenario::Step;

pub async fn handle(
    approval: &mut JobApproval,
    step: &Step,
    notifier: &dyn Notifier,
    navigator: &dyn Navigator,
) -> Option<Result<(), StepError>> {
    let result = match step {
        Step::RequestApproval => approval.request_approval(),
        Step::CancelApproval => {
            approval.cancel_approval();
            Ok(())
        }
        Step::ConfirmApproval => approval.confirm_approval(notifier, navigator).await,
        Step::ReportIssue { reason } => approval.report_issue(reason, notifier, navigator).await,
        Step::Back => {
            navigator.navigate(Navigation::to(Screen::Jobs));
            Ok(())
        }
        _ => return None,
    };
    Some(result.map_err(StepError::from))
}
