//! Delivery and at-most-once response resolution.
//!
//! After a reminder is sent, a choice listener and an acknowledgement
//! listener run concurrently. Both may observe the same human action, so
//! the first one to settle claims a [`ResolutionCell`]; every later
//! settlement is discarded. When all listeners finish without a response
//! the cell resolves as a timeout.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use super::errors::ReminderError;
use super::registry::{DeliveryContext, DeliveryReport};
use crate::domain::foundation::MessageHandle;
use crate::domain::reminder::Resolution;
use crate::ports::MessageSpec;

/// Single-assignment slot shared by the listeners of one message.
#[derive(Debug)]
pub struct ResolutionCell {
    handle: MessageHandle,
    claimed: AtomicBool,
    outstanding: AtomicUsize,
    exhausted: Resolution,
    sender: Mutex<Option<oneshot::Sender<Resolution>>>,
}

impl ResolutionCell {
    /// Create a cell awaited by `listeners` listeners.
    ///
    /// `exhausted` is the resolution used once every listener has given up.
    pub fn new(
        handle: MessageHandle,
        listeners: usize,
        exhausted: Resolution,
    ) -> (Arc<Self>, oneshot::Receiver<Resolution>) {
        let (tx, rx) = oneshot::channel();
        let cell = Arc::new(Self {
            handle,
            claimed: AtomicBool::new(false),
            outstanding: AtomicUsize::new(listeners),
            exhausted,
            sender: Mutex::new(Some(tx)),
        });
        (cell, rx)
    }

    /// Claim the cell with a response. Returns false if already resolved.
    pub fn try_resolve(&self, resolution: Resolution) -> bool {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let late = ReminderError::RaceResolution(self.handle);
            tracing::debug!(error = %late, kind = ?resolution.kind, "Late settlement discarded");
            return false;
        }
        self.fire(resolution);
        true
    }

    /// Record that one listener finished without observing a response.
    pub fn listener_gave_up(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.fire(self.exhausted.clone());
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    fn fire(&self, resolution: Resolution) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(sender) = sender {
            // Receiver gone means the cycle was abandoned
            let _ = sender.send(resolution);
        }
    }
}

/// Send `message`, race both listeners, and return whichever settles first.
///
/// Send failures resolve as [`Resolution::delivery_failed`] with the error
/// attached to the report; the caller keeps the chain alive.
pub async fn deliver_and_await(ctx: &DeliveryContext, message: &MessageSpec) -> DeliveryReport {
    let handle = match ctx.channel.send(&ctx.user_id, message).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(
                user_id = %ctx.user_id,
                reminder_type = %ctx.reminder_type,
                error = %err,
                "Reminder delivery failed"
            );
            return DeliveryReport::resolved(Resolution::delivery_failed(&ctx.policy))
                .with_failure(ReminderError::Delivery(err));
        }
    };

    let timeout = Duration::from_millis(ctx.policy.max_latency_ms);
    let (cell, rx) = ResolutionCell::new(handle, 2, Resolution::timed_out(&ctx.policy));

    let choice_listener = {
        let cell = cell.clone();
        let channel = ctx.channel.clone();
        let allowed = message.choice_ids();
        tokio::spawn(async move {
            match channel.await_choice(handle, &allowed, timeout).await {
                Ok(Some(response)) => {
                    cell.try_resolve(Resolution::choice(response.choice, response.elapsed_ms));
                }
                Ok(None) => cell.listener_gave_up(),
                Err(err) => {
                    tracing::warn!(message_handle = %handle, error = %err, "Choice listener failed");
                    cell.listener_gave_up();
                }
            }
        })
    };

    let ack_listener = {
        let cell = cell.clone();
        let channel = ctx.channel.clone();
        tokio::spawn(async move {
            match channel.await_ack(handle, timeout).await {
                Ok(Some(response)) => {
                    cell.try_resolve(Resolution::acknowledged(response.elapsed_ms));
                }
                Ok(None) => cell.listener_gave_up(),
                Err(err) => {
                    tracing::warn!(message_handle = %handle, error = %err, "Ack listener failed");
                    cell.listener_gave_up();
                }
            }
        })
    };

    let resolution = match rx.await {
        Ok(resolution) => resolution,
        // Both listeners died (panicked) before settling
        Err(_) => Resolution::timed_out(&ctx.policy),
    };

    choice_listener.abort();
    ack_listener.abort();

    tracing::debug!(
        user_id = %ctx.user_id,
        reminder_type = %ctx.reminder_type,
        kind = ?resolution.kind,
        latency_ms = resolution.latency_ms,
        "Delivery resolved"
    );

    DeliveryReport::resolved(resolution)
}
