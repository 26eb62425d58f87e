//! Quote broadcast to nearby plumbers.
//!
//! The screen runs a three-stage state machine, `broadcasting -> receiving ->
//! complete`, then navigates to the jobs list on its own. Stage changes and
//! recipient reveals are [`BroadcastEvent`]s applied to [`BroadcastState`];
//! the events come either from a fixed timeline ([`BroadcastSimulation::start`])
//! or from recipient acknowledgments with a timeout fallback
//! ([`BroadcastSimulation::start_with_acks`]).
//!
//! The driver runs on its own task. Dropping the [`BroadcastSimulation`]
//! aborts it, so nothing fires after the screen is torn down.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info};

use crate::navigation::{Navigation, Navigator, Screen};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub distance: String,
}

impl Recipient {
    pub fn new(id: &str, name: &str, distance: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            distance: distance.to_string(),
        }
    }
}

/// Plumbers near the default job address, nearest first.
pub fn nearby_plumbers() -> Vec<Recipient> {
    vec![
        Recipient::new("1", "Mike Johnson", "1.2 mi"),
        Recipient::new("2", "Sarah Martinez", "1.8 mi"),
        Recipient::new("3", "David Chen", "2.1 mi"),
        Recipient::new("4", "Lisa Anderson", "2.4 mi"),
        Recipient::new("5", "Robert Taylor", "2.7 mi"),
        Recipient::new("6", "Emily Wilson", "2.9 mi"),
        Recipient::new("7", "James Brown", "3.2 mi"),
        Recipient::new("8", "Maria Garcia", "3.5 mi"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Broadcasting,
    Receiving,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Broadcasting => "broadcasting",
            Stage::Receiving => "receiving",
            Stage::Complete => "complete",
        })
    }
}

/// Offsets of the scripted broadcast, all measured from mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSchedule {
    /// Time spent in `broadcasting`; also when the first recipient shows up.
    pub initial: Duration,
    /// Gap between consecutive recipient reveals.
    pub stagger: Duration,
    /// Pause after the last reveal before `complete`.
    pub settle: Duration,
    /// Time `complete` stays on screen before navigating away.
    pub exit: Duration,
    /// Acknowledgment mode only: give up waiting this long after `receiving`.
    pub ack_timeout: Duration,
}

impl Default for BroadcastSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(1500),
            stagger: Duration::from_millis(200),
            settle: Duration::from_millis(1000),
            exit: Duration::from_millis(2000),
            ack_timeout: Duration::from_secs(10),
        }
    }
}

impl BroadcastSchedule {
    pub fn reveal_at(&self, index: usize) -> Duration {
        self.initial + self.stagger * index as u32
    }

    pub fn complete_at(&self, recipients: usize) -> Duration {
        self.initial + self.stagger * recipients as u32 + self.settle
    }

    pub fn navigate_at(&self, recipients: usize) -> Duration {
        self.complete_at(recipients) + self.exit
    }

    /// Every scripted event with its offset, in firing order.
    pub fn timeline(&self, recipients: &[Recipient]) -> Vec<(Duration, BroadcastEvent)> {
        let mut events = Vec::with_capacity(recipients.len() + 3);
        events.push((self.initial, BroadcastEvent::StartReceiving));
        for (index, recipient) in recipients.iter().enumerate() {
            events.push((
                self.reveal_at(index),
                BroadcastEvent::Acknowledged(recipient.id.clone()),
            ));
        }
        events.push((self.complete_at(recipients.len()), BroadcastEvent::Settle));
        events.push((self.navigate_at(recipients.len()), BroadcastEvent::Finish));
        // stable: same-instant events keep their push order
        events.sort_by_key(|(offset, _)| *offset);
        events
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastEvent {
    StartReceiving,
    Acknowledged(String),
    Settle,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastSnapshot {
    pub stage: Stage,
    pub notified: usize,
    /// Recipient ids in the order they appeared.
    pub visible: Vec<String>,
    pub total: usize,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct BroadcastState {
    recipients: Vec<Recipient>,
    snapshot: BroadcastSnapshot,
}

impl BroadcastState {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        let total = recipients.len();
        Self {
            recipients,
            snapshot: BroadcastSnapshot {
                stage: Stage::Broadcasting,
                notified: 0,
                visible: Vec::new(),
                total,
                finished: false,
            },
        }
    }

    pub fn snapshot(&self) -> &BroadcastSnapshot {
        &self.snapshot
    }

    pub fn stage(&self) -> Stage {
        self.snapshot.stage
    }

    pub fn all_acknowledged(&self) -> bool {
        self.snapshot.visible.len() == self.recipients.len()
    }

    fn advance_to(&mut self, stage: Stage) -> bool {
        if stage <= self.snapshot.stage {
            return false;
        }
        info!(from = %self.snapshot.stage, to = %stage, "broadcast stage");
        self.snapshot.stage = stage;
        true
    }

    /// Applies one event; returns whether anything changed.
    pub fn apply(&mut self, event: BroadcastEvent) -> bool {
        if self.snapshot.finished {
            return false;
        }
        match event {
            BroadcastEvent::StartReceiving => self.advance_to(Stage::Receiving),
            BroadcastEvent::Acknowledged(id) => {
                let known = self.recipients.iter().any(|r| r.id == id);
                if !known || self.snapshot.visible.contains(&id) {
                    debug!(%id, known, "ignored acknowledgment");
                    return false;
                }
                debug!(%id, "recipient notified");
                self.snapshot.visible.push(id);
                self.snapshot.notified += 1;
                true
            }
            BroadcastEvent::Settle => self.advance_to(Stage::Complete),
            BroadcastEvent::Finish => {
                self.snapshot.finished = true;
                true
            }
        }
    }
}

/// Handle to a running broadcast screen.
pub struct BroadcastSimulation {
    state: watch::Receiver<BroadcastSnapshot>,
    task: JoinHandle<()>,
}

struct Driver {
    state: BroadcastState,
    publish: watch::Sender<BroadcastSnapshot>,
    navigator: Arc<dyn Navigator>,
}

impl Driver {
    fn apply(&mut self, event: BroadcastEvent) {
        let finish = event == BroadcastEvent::Finish;
        if self.state.apply(event) {
            self.publish.send_replace(self.state.snapshot().clone());
            if finish {
                self.navigator.navigate(Navigation::to(Screen::Jobs));
            }
        }
    }

    async fn run_script(mut self, timeline: Vec<(Duration, BroadcastEvent)>) {
        let mounted = Instant::now();
        for (offset, event) in timeline {
            sleep_until(mounted + offset).await;
            self.apply(event);
        }
    }

    async fn run_acks(
        mut self,
        schedule: BroadcastSchedule,
        mut acks: mpsc::UnboundedReceiver<String>,
    ) {
        let mounted = Instant::now();
        sleep_until(mounted + schedule.initial).await;
        self.apply(BroadcastEvent::StartReceiving);

        let deadline = sleep_until(mounted + schedule.initial + schedule.ack_timeout);
        tokio::pin!(deadline);
        loop {
            if self.state.all_acknowledged() {
                tokio::select! {
                    _ = sleep(schedule.settle) => {}
                    _ = &mut deadline => {}
                }
                break;
            }
            tokio::select! {
                ack = acks.recv() => match ack {
                    Some(id) => self.apply(BroadcastEvent::Acknowledged(id)),
                    None => {
                        (&mut deadline).await;
                        break;
                    }
                },
                _ = &mut deadline => {
                    info!(
                        acknowledged = self.state.snapshot().notified,
                        total = self.state.snapshot().total,
                        "acknowledgment timeout"
                    );
                    break;
                }
            }
        }

        self.apply(BroadcastEvent::Settle);
        sleep(schedule.exit).await;
        self.apply(BroadcastEvent::Finish);
    }
}

impl BroadcastSimulation {
    fn driver(recipients: Vec<Recipient>, navigator: Arc<dyn Navigator>) -> (Driver, watch::Receiver<BroadcastSnapshot>) {
        let state = BroadcastState::new(recipients);
        let (publish, rx) = watch::channel(state.snapshot().clone());
        (
            Driver {
                state,
                publish,
                navigator,
            },
            rx,
        )
    }

    /// Mounts the scripted broadcast. Must be called inside a tokio runtime.
    pub fn start(
        recipients: Vec<Recipient>,
        schedule: BroadcastSchedule,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        info!(recipients = recipients.len(), "broadcasting quote request");
        let timeline = schedule.timeline(&recipients);
        let (driver, state) = Self::driver(recipients, navigator);
        let task = tokio::spawn(driver.run_script(timeline));
        Self { state, task }
    }

    /// Mounts a broadcast whose reveals come from `acks` (recipient ids).
    pub fn start_with_acks(
        recipients: Vec<Recipient>,
        schedule: BroadcastSchedule,
        acks: mpsc::UnboundedReceiver<String>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        info!(recipients = recipients.len(), "broadcasting quote request, awaiting acknowledgments");
        let (driver, state) = Self::driver(recipients, navigator);
        let task = tokio::spawn(driver.run_acks(schedule, acks));
        Self { state, task }
    }

    pub fn snapshot(&self) -> BroadcastSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BroadcastSnapshot> {
        self.state.clone()
    }

    /// Waits until the broadcast has navigated away, or its driver is gone.
    pub async fn finished(&mut self) -> BroadcastSnapshot {
        if let Ok(snapshot) = self.state.wait_for(|s| s.finished).await {
            return snapshot.clone();
        }
        self.state.borrow().clone()
    }

    /// Tears the screen down. Same as dropping it.
    pub fn cancel(self) {}
}

impl Drop for BroadcastSimulation {
    fn drop(&mut self) {
        self.task.abort();
    }
}
