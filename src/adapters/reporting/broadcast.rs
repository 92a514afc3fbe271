//! Outcome publisher backed by a tokio broadcast channel.
//!
//! Lets a messaging layer in the same process subscribe to outcomes
//! and format them for users.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::foundation::DomainError;
use crate::ports::{OutcomeEvent, OutcomePublisher};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct BroadcastOutcomePublisher {
    sender: broadcast::Sender<OutcomeEvent>,
}

impl BroadcastOutcomePublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutcomeEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastOutcomePublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutcomePublisher for BroadcastOutcomePublisher {
    async fn publish(&self, event: OutcomeEvent) -> Result<(), DomainError> {
        // No subscribers is not an error; outcomes are best-effort notifications
        if self.sender.send(event).is_err() {
            tracing::debug!("Outcome dropped, no subscribers");
        }
        Ok(())
    }
}
