//! Notification Channel Port - message delivery and response capture.
//!
//! A channel delivers a message and exposes two independent ways of
//! observing the user's reaction:
//!
//! - `await_choice` - the user pressed one of the offered choices
//! - `await_ack` - the user acknowledged passively (reaction, read mark)
//!
//! Both may observe the same human action. Deciding which one counts is
//! the scheduler's job, not the channel's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{MessageHandle, UserId};

/// One selectable answer attached to a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseChoice {
    /// Stable identifier reported back by the channel.
    pub id: String,
    /// Text shown to the user.
    pub label: String,
}

impl ResponseChoice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Platform-neutral description of a reminder message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub text: String,
    pub choices: Vec<ResponseChoice>,
}

impl MessageSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choice(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices.push(ResponseChoice::new(id, label));
        self
    }

    /// Identifiers the choice listener should accept.
    pub fn choice_ids(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.id.clone()).collect()
    }
}

/// A choice the user made, with time since the message was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceResponse {
    pub choice: String,
    pub elapsed_ms: u64,
}

/// A passive acknowledgement, with time since the message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckResponse {
    pub elapsed_ms: u64,
}

/// Errors raised by a notification channel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("User {0} is unreachable")]
    Unreachable(UserId),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Listener failed: {0}")]
    ListenerFailed(String),
}

/// Port for delivering reminders and observing responses.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver a message and return a handle for response tracking.
    async fn send(
        &self,
        user_id: &UserId,
        message: &MessageSpec,
    ) -> Result<MessageHandle, NotificationError>;

    /// Wait for the user to pick one of `allowed_choices`.
    ///
    /// Returns `Ok(None)` when `timeout` elapses without a choice.
    async fn await_choice(
        &self,
        handle: MessageHandle,
        allowed_choices: &[String],
        timeout: Duration,
    ) -> Result<Option<ChoiceResponse>, NotificationError>;

    /// Wait for a passive acknowledgement.
    ///
    /// Returns `Ok(None)` when `timeout` elapses without one.
    async fn await_ack(
        &self,
        handle: MessageHandle,
        timeout: Duration,
    ) -> Result<Option<AckResponse>, NotificationError>;
}
