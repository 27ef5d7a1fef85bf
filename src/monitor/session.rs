//! Monitoring session state

use super::AlertTarget;
use crate::feed::PriceTick;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One monitor-until-trigger-or-cancel run for a single target
#[derive(Debug, Clone)]
pub struct MonitorSession {
    pub id: Uuid,
    pub target: AlertTarget,
    pub started_at: DateTime<Utc>,
    triggered: bool,
}

impl MonitorSession {
    pub fn new(target: AlertTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            started_at: Utc::now(),
            triggered: false,
        }
    }

    /// Whether the single dispatch attempt has been made
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Record the dispatch attempt. Returns false if it was already recorded.
    pub fn mark_triggered(&mut self) -> bool {
        !std::mem::replace(&mut self.triggered, true)
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The crossing tick was seen and the alert went out
    Alerted(PriceTick),
    /// The crossing tick was seen but the alert could not be delivered
    DispatchFailed(PriceTick),
    /// Shutdown was requested before the target was crossed
    Cancelled,
}

impl SessionOutcome {
    /// The tick that crossed the target, if any
    pub fn trigger_tick(&self) -> Option<&PriceTick> {
        match self {
            SessionOutcome::Alerted(tick) | SessionOutcome::DispatchFailed(tick) => Some(tick),
            SessionOutcome::Cancelled => None,
        }
    }
}
