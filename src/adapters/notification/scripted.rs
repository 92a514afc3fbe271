//! Scripted notification channel for tests and simulations.
//!
//! Each user has a queue of scripted replies; every `send` consumes the
//! next one. Listener waits use `tokio::time`, so tests can drive them
//! with paused time.
//!
//! A sent message's reply is kept until both the choice and the ack
//! listener have read it.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::foundation::{MessageHandle, Timestamp, UserId};
use crate::ports::{AckResponse, ChoiceResponse, MessageSpec, NotificationChannel, NotificationError};

/// How the simulated user reacts to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// No reaction; both listeners run to their timeout.
    Silence,
    /// The user presses `choice` after `after`.
    Choice { choice: String, after: Duration },
    /// The user reacts passively after `after`.
    Ack { after: Duration },
    /// One action seen by both listeners.
    Both {
        choice: String,
        choice_after: Duration,
        ack_after: Duration,
    },
    /// `send` fails as if the user blocked the bot.
    Unreachable,
}

impl ScriptedReply {
    pub fn choice(choice: impl Into<String>, after: Duration) -> Self {
        ScriptedReply::Choice {
            choice: choice.into(),
            after,
        }
    }

    pub fn ack(after: Duration) -> Self {
        ScriptedReply::Ack { after }
    }
}

/// A message accepted by the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub user_id: UserId,
    pub handle: MessageHandle,
    pub message: MessageSpec,
    pub sent_at: Timestamp,
}

/// Listeners opened per message: one choice, one ack.
const LISTENERS_PER_MESSAGE: u8 = 2;

#[derive(Debug)]
struct PendingReply {
    reply: ScriptedReply,
    unread_by: u8,
}

#[derive(Debug, Default)]
struct ScriptState {
    scripts: HashMap<UserId, VecDeque<ScriptedReply>>,
    fallback: HashMap<UserId, ScriptedReply>,
    pending: HashMap<MessageHandle, PendingReply>,
    sent: Vec<SentMessage>,
}

/// Notification channel that replays scripted user behaviour.
#[derive(Debug, Default)]
pub struct ScriptedNotificationChannel {
    state: Mutex<ScriptState>,
}

impl ScriptedNotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next message sent to `user_id`.
    pub fn push_reply(&self, user_id: &UserId, reply: ScriptedReply) {
        self.lock()
            .scripts
            .entry(user_id.clone())
            .or_default()
            .push_back(reply);
    }

    /// Reply used once the queue for `user_id` is empty (default `Silence`).
    pub fn set_fallback(&self, user_id: &UserId, reply: ScriptedReply) {
        self.lock().fallback.insert(user_id.clone(), reply);
    }

    /// Every message accepted so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    pub fn sent_to(&self, user_id: &UserId) -> usize {
        self.lock().sent.iter().filter(|m| &m.user_id == user_id).count()
    }

    /// Messages whose listeners have not all read their reply yet.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reply_for(&self, handle: MessageHandle) -> Result<ScriptedReply, NotificationError> {
        let mut state = self.lock();
        let pending = state
            .pending
            .get_mut(&handle)
            .ok_or_else(|| NotificationError::ListenerFailed(format!("unknown message {}", handle)))?;
        pending.unread_by = pending.unread_by.saturating_sub(1);
        let reply = pending.reply.clone();
        if pending.unread_by == 0 {
            state.pending.remove(&handle);
        }
        Ok(reply)
    }
}

#[async_trait]
impl NotificationChannel for ScriptedNotificationChannel {
    async fn send(
        &self,
        user_id: &UserId,
        message: &MessageSpec,
    ) -> Result<MessageHandle, NotificationError> {
        let mut state = self.lock();
        let queued = state.scripts.get_mut(user_id).and_then(VecDeque::pop_front);
        let reply = match queued {
            Some(reply) => reply,
            None => state
                .fallback
                .get(user_id)
                .cloned()
                .unwrap_or(ScriptedReply::Silence),
        };

        if reply == ScriptedReply::Unreachable {
            return Err(NotificationError::Unreachable(user_id.clone()));
        }

        let handle = MessageHandle::new();
        state.pending.insert(
            handle,
            PendingReply {
                reply,
                unread_by: LISTENERS_PER_MESSAGE,
            },
        );
        state.sent.push(SentMessage {
            user_id: user_id.clone(),
            handle,
            message: message.clone(),
            sent_at: Timestamp::now(),
        });
        Ok(handle)
    }

    async fn await_choice(
        &self,
        handle: MessageHandle,
        allowed_choices: &[String],
        timeout: Duration,
    ) -> Result<Option<ChoiceResponse>, NotificationError> {
        let (choice, after) = match self.reply_for(handle)? {
            ScriptedReply::Choice { choice, after } => (choice, after),
            ScriptedReply::Both {
                choice,
                choice_after,
                ..
            } => (choice, choice_after),
            _ => {
                tokio::time::sleep(timeout).await;
                return Ok(None);
            }
        };

        if after > timeout || !allowed_choices.contains(&choice) {
            tokio::time::sleep(timeout).await;
            return Ok(None);
        }

        tokio::time::sleep(after).await;
        Ok(Some(ChoiceResponse {
            choice,
            elapsed_ms: after.as_millis() as u64,
        }))
    }

    async fn await_ack(
        &self,
        handle: MessageHandle,
        timeout: Duration,
    ) -> Result<Option<AckResponse>, NotificationError> {
        let after = match self.reply_for(handle)? {
            ScriptedReply::Ack { after } => after,
            ScriptedReply::Both { ack_after, .. } => ack_after,
            _ => {
                tokio::time::sleep(timeout).await;
                return Ok(None);
            }
        };

        if after > timeout {
            tokio::time::sleep(timeout).await;
            return Ok(None);
        }

        tokio::time::sleep(after).await;
        Ok(Some(AckResponse {
            elapsed_ms: after.as_millis() as u64,
        }))
    }
}
