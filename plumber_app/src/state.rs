use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use plumber_flow::approval::JobApproval;
use plumber_flow::broadcast::BroadcastSnapshot;
use plumber_flow::config::FlowConfig;
use plumber_flow::details::DetailsView;
use plumber_flow::history::JobHistory;
use plumber_flow::navigation::{Navigation, Screen};
use plumber_flow::notify::Notification;
use plumber_flow::records::JobRepository;
use plumber_flow::tracker::{JobStatusTracker, JobSubmitted, Submission, TransitionPolicy};

/// The session mounted on the current screen.
#[derive(Debug)]
pub enum View {
    /// Screens with nothing to interact with (home, jobs).
    Idle,
    Tracker(JobStatusTracker),
    Submitted(JobSubmitted),
    Approval(JobApproval),
    History(JobHistory),
    Details(DetailsView),
}

// Parent router state: current screen, its view, and what the views emitted.
pub struct AppState {
    pub config: FlowConfig,
    pub policy: TransitionPolicy,
    pub repo: Arc<dyn JobRepository>,
    pub screen: Screen,
    pub view: View,
    pub last_submission: Option<Submission>,
    pub broadcast: Option<BroadcastSnapshot>,

    pub nav_tx: UnboundedSender<Navigation>,
    pub nav_rx: UnboundedReceiver<Navigation>,
    pub notify_tx: UnboundedSender<Notification>,
    pub notify_rx: UnboundedReceiver<Notification>,

    pub trail: Vec<Navigation>,
    pub notifications: Vec<Notification>,
}

impl AppState {
    pub fn new(config: FlowConfig, policy: TransitionPolicy, repo: Arc<dyn JobRepository>) -> Self {
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        AppState {
            config,
            policy,
            repo,
            screen: Screen::PlumberHome,
            view: View::Idle,
            last_submission: None,
            broadcast: None,
            nav_tx,
            nav_rx,
            notify_tx,
            notify_rx,
            trail: Vec::new(),
            notifications: Vec::new(),
        }
    }
}
