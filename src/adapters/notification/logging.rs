//! Notification channel that only logs.
//!
//! Used by the binary when no chat platform is wired in. Messages are
//! written to the tracing output and no response ever arrives, so every
//! cycle resolves as a timeout.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::{MessageHandle, UserId};
use crate::ports::{AckResponse, ChoiceResponse, MessageSpec, NotificationChannel, NotificationError};

#[derive(Debug, Clone, Default)]
pub struct LoggingNotificationChannel;

impl LoggingNotificationChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for LoggingNotificationChannel {
    async fn send(
        &self,
        user_id: &UserId,
        message: &MessageSpec,
    ) -> Result<MessageHandle, NotificationError> {
        let handle = MessageHandle::new();
        let choices: Vec<&str> = message.choices.iter().map(|c| c.label.as_str()).collect();
        tracing::info!(
            user_id = %user_id,
            message_handle = %handle,
            choices = ?choices,
            "{}",
            message.text
        );
        Ok(handle)
    }

    async fn await_choice(
        &self,
        _handle: MessageHandle,
        _allowed_choices: &[String],
        timeout: Duration,
    ) -> Result<Option<ChoiceResponse>, NotificationError> {
        tokio::time::sleep(timeout).await;
        Ok(None)
    }

    async fn await_ack(
        &self,
        _handle: MessageHandle,
        timeout: Duration,
    ) -> Result<Option<AckResponse>, NotificationError> {
        tokio::time::sleep(timeout).await;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn listeners_always_time_out() {
        let channel = LoggingNotificationChannel::new();
        let user = UserId::new("u-1").unwrap();
        let handle = channel
            .send(&user, &MessageSpec::new("Stand up"))
            .await
            .unwrap();

        let choice = channel
            .await_choice(handle, &[], Duration::from_secs(1))
            .await
            .unwrap();
        let ack = channel.await_ack(handle, Duration::from_secs(1)).await.unwrap();
        assert!(choice.is_none());
        assert!(ack.is_none());
    }
}
