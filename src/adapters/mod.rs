//! Adapters - Implementations of port interfaces.
//!
//! - `preferences` - Preference stores (in-memory, YAML file)
//! - `activity` - Activity log (in-memory)
//! - `clock` - System and tokio-driven clocks
//! - `notification` - Notification channels (scripted, logging)
//! - `reporting` - Outcome publishers and error sinks

pub mod activity;
pub mod clock;
pub mod notification;
pub mod preferences;
pub mod reporting;

pub use activity::InMemoryActivityLog;
pub use clock::{SystemClock, TokioClock};
pub use notification::{LoggingNotificationChannel, ScriptedNotificationChannel, ScriptedReply};
pub use preferences::{InMemoryPreferenceStore, YamlPreferenceStore};
pub use reporting::{
    BroadcastOutcomePublisher, RecordingErrorSink, RecordingOutcomePublisher, TracingErrorSink,
    TracingOutcomePublisher,
};
