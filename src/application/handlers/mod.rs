//! Built-in reminder handlers.
//!
//! - `WaterHandler` - hydration reminders that log the amount drunk
//! - `StretchHandler` - movement breaks acknowledged with a single choice

mod stretch;
mod water;

pub use stretch::StretchHandler;
pub use water::WaterHandler;
