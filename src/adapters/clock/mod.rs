//! Clock adapters.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::time::Instant;

use crate::ports::Clock;

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock anchored at a fixed instant that advances with tokio's clock.
///
/// Under `tokio::time::pause` the reported time moves exactly as far as
/// the runtime's virtual clock, so window checks stay consistent with timers.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    anchor: DateTime<Utc>,
    started: Instant,
}

impl TokioClock {
    pub fn starting_at(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            started: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now().saturating_duration_since(self.started);
        match ChronoDuration::from_std(elapsed) {
            Ok(elapsed) => self.anchor + elapsed,
            Err(_) => self.anchor,
        }
    }
}
