//! Screen identifiers and the navigation hand-off between views.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::records::RecordCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    PlumberHome,
    PlumberJobTracker,
    PlumberJobSubmitted,
    PlumberJobHistory,
    PlumberJobDetails,
    Jobs,
    JobApproval,
    QuoteBroadcast,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::PlumberHome => "plumber-home",
            Screen::PlumberJobTracker => "plumber-job-tracker",
            Screen::PlumberJobSubmitted => "plumber-job-submitted",
            Screen::PlumberJobHistory => "plumber-job-history",
            Screen::PlumberJobDetails => "plumber-job-details",
            Screen::Jobs => "jobs",
            Screen::JobApproval => "job-approval",
            Screen::QuoteBroadcast => "quote-broadcast",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a job record, carried by detail navigations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRef {
    pub id: String,
    pub category: RecordCategory,
}

impl JobRef {
    pub fn new(id: impl Into<String>, category: RecordCategory) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub screen: Screen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
}

impl Navigation {
    pub fn to(screen: Screen) -> Self {
        Self { screen, job: None }
    }

    pub fn with_job(screen: Screen, job: JobRef) -> Self {
        Self {
            screen,
            job: Some(job),
        }
    }
}

impl From<Screen> for Navigation {
    fn from(screen: Screen) -> Self {
        Navigation::to(screen)
    }
}

/// Whoever owns the current screen. Views only ever ask it to move on.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

impl Navigator for UnboundedSender<Navigation> {
    fn navigate(&self, navigation: Navigation) {
        debug!(screen = %navigation.screen, "navigate");
        if self.send(navigation).is_err() {
            // router is gone; nothing left to show
            warn!("navigation dropped, router closed");
        }
    }
}
