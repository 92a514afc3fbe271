//! How a delivery cycle settled.

use serde::{Deserialize, Serialize};

use crate::domain::streak::StreakPolicy;

/// The event that closed a delivery cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionKind {
    /// The user picked one of the offered choices.
    Choice { choice: String },
    /// The user acknowledged the message passively (reaction, read receipt).
    Acknowledged,
    /// Neither listener settled before the deadline.
    TimedOut,
    /// The message could not be sent at all.
    DeliveryFailed,
}

impl ResolutionKind {
    /// True if a human action was observed.
    pub fn is_response(&self) -> bool {
        matches!(self, ResolutionKind::Choice { .. } | ResolutionKind::Acknowledged)
    }
}

/// Settled cycle with the latency the streak engine should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub kind: ResolutionKind,
    pub latency_ms: u64,
}

impl Resolution {
    pub fn choice(choice: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            kind: ResolutionKind::Choice {
                choice: choice.into(),
            },
            latency_ms,
        }
    }

    pub fn acknowledged(latency_ms: u64) -> Self {
        Self {
            kind: ResolutionKind::Acknowledged,
            latency_ms,
        }
    }

    /// No response; latency lands just past the policy's allowance.
    pub fn timed_out(policy: &StreakPolicy) -> Self {
        Self {
            kind: ResolutionKind::TimedOut,
            latency_ms: policy.timed_out_latency(),
        }
    }

    /// Send failure counts as a timeout for streak purposes.
    pub fn delivery_failed(policy: &StreakPolicy) -> Self {
        Self {
            kind: ResolutionKind::DeliveryFailed,
            latency_ms: policy.timed_out_latency(),
        }
    }

    /// Chosen option, if the user picked one.
    pub fn chosen(&self) -> Option<&str> {
        match &self.kind {
            ResolutionKind::Choice { choice } => Some(choice),
            _ => None,
        }
    }
}
