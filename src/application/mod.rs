//! Application layer - Scheduler, handlers, and commands.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//!
//! - `scheduler` - Reminder chains per user and reminder type
//! - `delivery` - Send plus at-most-once response resolution
//! - `registry` - Per-type reminder handlers
//! - `handlers` - Built-in water and stretch handlers
//! - `commands` - Configure reminders, query streaks

pub mod commands;
pub mod delivery;
pub mod errors;
pub mod handlers;
pub mod registry;
pub mod scheduler;

pub use commands::{
    ConfigureReminderCommand, ConfigureReminderHandler, ConfigureReminderResult,
    GetStreakHandler, GetStreakQuery,
};
pub use delivery::{deliver_and_await, ResolutionCell};
pub use errors::ReminderError;
pub use handlers::{StretchHandler, WaterHandler};
pub use registry::{DeliveryContext, DeliveryReport, HandlerRegistry, ReminderHandler};
pub use scheduler::{InitializeSummary, ReminderScheduler, SchedulerPorts};
