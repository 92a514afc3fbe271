//! Notification channel adapters.

mod logging;
mod scripted;

pub use logging::LoggingNotificationChannel;
pub use scripted::{ScriptedNotificationChannel, ScriptedReply, SentMessage};
