//! Daily delivery window arithmetic.
//!
//! A window is a `[start, end)` interval of local wall-clock time,
//! interpreted in the user's IANA timezone. Windows never wrap midnight.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::TimeOfDay;
use crate::domain::foundation::ValidationError;

/// Longest DST gap we step across when a window start falls inside one.
const MAX_GAP_MINUTES: i64 = 180;

/// Returns true if `now`, seen in `tz`, falls inside `[start, end)`.
pub fn is_within_window(now: DateTime<Utc>, tz: Tz, start: TimeOfDay, end: TimeOfDay) -> bool {
    let local = now.with_timezone(&tz).time();
    local >= start.as_naive() && local < end.as_naive()
}

/// Returns the next instant strictly after `now` at which the window opens.
///
/// Before today's start this is today's start; otherwise (inside the
/// window or already past its end) it is tomorrow's start.
pub fn next_window_start(
    now: DateTime<Utc>,
    tz: Tz,
    start: TimeOfDay,
    _end: TimeOfDay,
) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let today = local.date_naive();

    if local.time() < start.as_naive() {
        let candidate = resolve_local(tz, today, start.as_naive());
        if candidate > now {
            return candidate;
        }
    }

    let mut day = today;
    loop {
        day = match day.succ_opt() {
            Some(next) => next,
            None => return now + Duration::days(1),
        };
        let candidate = resolve_local(tz, day, start.as_naive());
        if candidate > now {
            return candidate;
        }
    }
}

/// Maps a local date and time to UTC.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times that
/// do not exist (spring-forward gap) move to the first valid minute after.
fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    for offset in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&(naive + Duration::minutes(offset))) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => continue,
        }
    }
    Utc.from_utc_datetime(&naive)
}

/// A validated daily window bound to a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    start: TimeOfDay,
    end: TimeOfDay,
    timezone: Tz,
}

impl DeliveryWindow {
    /// Creates a window, requiring `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay, timezone: Tz) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::invalid_format(
                "end_time",
                format!("window end {} must be after start {}", end, start),
            ));
        }
        Ok(Self {
            start,
            end,
            timezone,
        })
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        is_within_window(now, self.timezone, self.start, self.end)
    }

    pub fn next_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_window_start(now, self.timezone, self.start, self.end)
    }

    /// Time to wait before the window is open, or zero if it already is.
    pub fn wait_from(&self, now: DateTime<Utc>) -> std::time::Duration {
        if self.contains(now) {
            return std::time::Duration::ZERO;
        }
        (self.next_start(now) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ValidationError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone(name.to_string()))
}
