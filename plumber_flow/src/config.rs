//! Runtime knobs, read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::broadcast::BroadcastSchedule;
use crate::error::{FlowError, Result};

pub const DEFAULT_BASE_FEE: f64 = 68.0;
pub const DEFAULT_APPROVAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig {
    pub base_fee: f64,
    /// How long a decision notification stays up before navigating away.
    pub approval_delay: Duration,
    pub broadcast: BroadcastSchedule,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_fee: DEFAULT_BASE_FEE,
            approval_delay: DEFAULT_APPROVAL_DELAY,
            broadcast: BroadcastSchedule::default(),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| FlowError::Config(format!("{key} has an invalid value: {raw:?}"))),
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Result<Duration> {
    Ok(parse_var::<u64>(lookup, key)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}

impl FlowConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = FlowConfig::default();
        let base_fee = parse_var::<f64>(&lookup, "PLUMBER_BASE_FEE")?.unwrap_or(defaults.base_fee);
        if !(base_fee.is_finite() && base_fee >= 0.0) {
            return Err(FlowError::Config(format!(
                "PLUMBER_BASE_FEE must be a non-negative number, got {base_fee}"
            )));
        }

        let d = defaults.broadcast;
        let broadcast = BroadcastSchedule {
            initial: millis(&lookup, "BROADCAST_INITIAL_MS", d.initial)?,
            stagger: millis(&lookup, "BROADCAST_STAGGER_MS", d.stagger)?,
            settle: millis(&lookup, "BROADCAST_SETTLE_MS", d.settle)?,
            exit: millis(&lookup, "BROADCAST_EXIT_MS", d.exit)?,
            ack_timeout: millis(&lookup, "BROADCAST_ACK_TIMEOUT_MS", d.ack_timeout)?,
        };

        Ok(Self {
            base_fee,
            approval_delay: millis(&lookup, "APPROVAL_DELAY_MS", defaults.approval_delay)?,
            broadcast,
        })
    }
}
