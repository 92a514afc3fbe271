//! Reminder module - delivery windows, jitter and per-chain lifecycle.

mod jitter;
mod preference;
mod resolution;
mod schedule_state;
mod time_of_day;
mod window;

pub use jitter::{next_delay, JitterPolicy};
pub use preference::{ReminderPreference, MAX_FREQUENCY_MINUTES};
pub use resolution::{Resolution, ResolutionKind};
pub use schedule_state::ScheduleState;
pub use time_of_day::TimeOfDay;
pub use window::{is_within_window, next_window_start, parse_timezone, DeliveryWindow};
