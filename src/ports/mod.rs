//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the reminder core and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `PreferenceStore` - Per-user reminder configuration
//! - `NotificationChannel` - Message delivery plus choice/ack listeners
//! - `ActivityLog` - Logged actions and streak records
//! - `Clock` - Current wall-clock time
//!
//! ## Reporting Ports
//!
//! - `OutcomePublisher` - Streak outcomes for user-facing messaging
//! - `ErrorSink` - Failures that must not stop a reminder chain

mod activity_log;
mod clock;
mod error_sink;
mod notification_channel;
mod outcome_publisher;
mod preference_store;

pub use activity_log::{ActivityEntry, ActivityLog, ActivityLogError};
pub use clock::Clock;
pub use error_sink::ErrorSink;
pub use notification_channel::{
    AckResponse, ChoiceResponse, MessageSpec, NotificationChannel, NotificationError,
    ResponseChoice,
};
pub use outcome_publisher::{OutcomeEvent, OutcomePublisher};
pub use preference_store::{PreferenceStore, PreferenceStoreError};
