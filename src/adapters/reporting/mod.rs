//! Outcome and error reporting adapters.

mod broadcast;
mod recording;
mod tracing_sink;

pub use broadcast::BroadcastOutcomePublisher;
pub use recording::{RecordingErrorSink, RecordingOutcomePublisher};
pub use tracing_sink::{TracingErrorSink, TracingOutcomePublisher};
