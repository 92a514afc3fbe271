//! Interval jitter between consecutive reminders.
//!
//! With jitter enabled the next delay is drawn uniformly from
//! `[base, base * multiplier]` minutes.

use rand::Rng;
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: u64 = 60_000;

/// Computes the next delay in milliseconds.
///
/// Multipliers below 1.0 (or non-finite) are treated as 1.0.
pub fn next_delay<R: Rng + ?Sized>(
    rng: &mut R,
    base_minutes: u32,
    randomize: bool,
    multiplier: f64,
) -> u64 {
    let base_ms = u64::from(base_minutes) * MILLIS_PER_MINUTE;
    if !randomize {
        return base_ms;
    }

    let multiplier = if multiplier.is_finite() && multiplier > 1.0 {
        multiplier
    } else {
        1.0
    };
    let upper_ms = (base_ms as f64 * multiplier).round() as u64;
    if upper_ms <= base_ms {
        return base_ms;
    }
    rng.gen_range(base_ms..=upper_ms)
}

/// Jitter settings resolved for one reminder chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterPolicy {
    pub base_minutes: u32,
    pub randomize: bool,
    pub multiplier: f64,
}

impl JitterPolicy {
    pub fn new(base_minutes: u32, randomize: bool, multiplier: f64) -> Self {
        Self {
            base_minutes,
            randomize,
            multiplier,
        }
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> std::time::Duration {
        std::time::Duration::from_millis(next_delay(
            rng,
            self.base_minutes,
            self.randomize,
            self.multiplier,
        ))
    }
}
