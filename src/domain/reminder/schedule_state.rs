//! Lifecycle of one reminder chain.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// State of a `(user, reminder type)` chain inside the scheduler.
///
/// ```text
/// Idle ──► Armed ──► Delivering ──► Resolved ──► Armed ──► ...
///   │        ▲  │                      │
///   └────────┼──┴──────────────────────┴──► Stopped
///            └──────────── start ─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    /// No timer; reminders disabled or never started.
    Idle,
    /// A timer is pending for the next delivery or window opening.
    Armed,
    /// A reminder was sent and the cycle awaits a response or timeout.
    Delivering,
    /// The cycle settled; the streak transition has been applied.
    Resolved,
    /// Explicitly stopped by the caller.
    Stopped,
}

impl StateMachine for ScheduleState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ScheduleState::*;
        matches!(
            (self, target),
            (Idle, Armed)
                | (Idle, Delivering)
                | (Armed, Armed)
                | (Armed, Delivering)
                | (Armed, Idle)
                | (Delivering, Resolved)
                | (Resolved, Armed)
                | (Resolved, Idle)
                | (Stopped, Armed)
                | (Stopped, Delivering)
                | (Idle, Stopped)
                | (Armed, Stopped)
                | (Delivering, Stopped)
                | (Resolved, Stopped)
                | (Stopped, Stopped)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ScheduleState::*;
        match self {
            Idle => vec![Armed, Delivering, Stopped],
            Armed => vec![Armed, Delivering, Idle, Stopped],
            Delivering => vec![Resolved, Stopped],
            Resolved => vec![Armed, Idle, Stopped],
            Stopped => vec![Armed, Delivering, Stopped],
        }
    }
}

impl std::fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScheduleState::Idle => "idle",
            ScheduleState::Armed => "armed",
            ScheduleState::Delivering => "delivering",
            ScheduleState::Resolved => "resolved",
            ScheduleState::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}
