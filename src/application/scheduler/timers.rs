//! Timer table - at most one live chain per schedule key.
//!
//! Each armed chain gets a fresh generation number. A chain task checks its
//! generation before every side effect that would extend the chain, so a
//! stopped or superseded chain finishes its current write and then exits
//! without re-arming.
//!
//! The task of a cancelled chain is kept as the key's draining task and
//! handed to the next chain armed for that key, which waits for it before
//! delivering. Deliveries for one key therefore never overlap.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::foundation::{ScheduleKey, StateMachine};
use crate::domain::reminder::ScheduleState;

#[derive(Debug)]
struct LiveChain {
    generation: u64,
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl LiveChain {
    fn cancel(self) {
        // Receiver may be gone if the task already exited
        let _ = self.cancel.send(true);
    }
}

#[derive(Debug)]
struct Slot {
    state: ScheduleState,
    live: Option<LiveChain>,
    draining: Option<JoinHandle<()>>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            state: ScheduleState::Idle,
            live: None,
            draining: None,
        }
    }

    /// Cancel the live chain, keeping its task as the draining one.
    fn cancel_live(&mut self) -> bool {
        match self.live.take() {
            Some(mut live) => {
                if let Some(task) = live.task.take() {
                    self.draining = Some(task);
                }
                live.cancel();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    slots: HashMap<ScheduleKey, Slot>,
    next_generation: u64,
}

/// Registered chains and their lifecycle states.
#[derive(Debug, Default)]
pub struct TimerTable {
    inner: Mutex<Table>,
}

/// Credentials handed to a freshly armed chain.
#[derive(Debug)]
pub struct ChainTicket {
    pub generation: u64,
    pub cancel: watch::Receiver<bool>,
    /// Task of the chain this one replaces, if it may still be running.
    pub predecessor: Option<JoinHandle<()>>,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new chain for `key` in `initial`, cancelling any existing one.
    pub fn arm(&self, key: &ScheduleKey, initial: ScheduleState) -> ChainTicket {
        let mut table = self.lock();
        table.next_generation += 1;
        let generation = table.next_generation;
        let (tx, rx) = watch::channel(false);

        let slot = table.slots.entry(key.clone()).or_insert_with(Slot::empty);
        if let Some(live) = &slot.live {
            tracing::debug!(key = %key, superseded = live.generation, "Replacing live chain");
        }
        slot.cancel_live();
        slot.state = initial;
        slot.live = Some(LiveChain {
            generation,
            cancel: tx,
            task: None,
        });
        let predecessor = slot.draining.take().filter(|task| !task.is_finished());

        ChainTicket {
            generation,
            cancel: rx,
            predecessor,
        }
    }

    /// Remember the task driving `generation` so shutdown can wait for it.
    pub fn attach(&self, key: &ScheduleKey, generation: u64, task: JoinHandle<()>) {
        let mut table = self.lock();
        match table.slots.get_mut(key).and_then(|slot| slot.live.as_mut()) {
            Some(live) if live.generation == generation => live.task = Some(task),
            // Chain already ended or was replaced; nothing left to track
            _ => {}
        }
    }

    pub fn is_current(&self, key: &ScheduleKey, generation: u64) -> bool {
        self.lock()
            .slots
            .get(key)
            .and_then(|slot| slot.live.as_ref())
            .is_some_and(|live| live.generation == generation)
    }

    /// Move a live chain to `target`.
    ///
    /// Returns false when `generation` is no longer live or the transition
    /// is not allowed; the caller must not extend the chain in that case.
    pub fn advance(&self, key: &ScheduleKey, generation: u64, target: ScheduleState) -> bool {
        let mut table = self.lock();
        let Some(slot) = table.slots.get_mut(key) else {
            return false;
        };
        if !slot.live.as_ref().is_some_and(|live| live.generation == generation) {
            return false;
        }
        if slot.state == target {
            return true;
        }
        match slot.state.transition_to(target) {
            Ok(next) => {
                slot.state = next;
                true
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Rejected schedule transition");
                false
            }
        }
    }

    /// Return a chain that has not begun a cycle to `Armed`.
    ///
    /// Unlike [`advance`](Self::advance) this also leaves a freshly armed
    /// `Delivering` slot, since no message went out yet.
    pub fn defer(&self, key: &ScheduleKey, generation: u64) -> bool {
        let mut table = self.lock();
        match table.slots.get_mut(key) {
            Some(slot) if slot.live.as_ref().is_some_and(|live| live.generation == generation) => {
                slot.state = ScheduleState::Armed;
                true
            }
            _ => false,
        }
    }

    /// End a chain from inside its own task, leaving the key `Idle`.
    pub fn release(&self, key: &ScheduleKey, generation: u64) {
        let mut table = self.lock();
        if let Some(slot) = table.slots.get_mut(key) {
            if slot.live.as_ref().is_some_and(|live| live.generation == generation) {
                slot.live = None;
                slot.state = ScheduleState::Idle;
            }
        }
    }

    /// Cancel any live chain for `key` and record `final_state`.
    ///
    /// Returns true if a live chain was cancelled. Never blocks on the task.
    pub fn cancel(&self, key: &ScheduleKey, final_state: ScheduleState) -> bool {
        let mut table = self.lock();
        let slot = table.slots.entry(key.clone()).or_insert_with(Slot::empty);
        slot.state = final_state;
        slot.cancel_live()
    }

    /// Cancel every live chain, returning their tasks and any still draining.
    pub fn cancel_all(&self) -> Vec<JoinHandle<()>> {
        let mut table = self.lock();
        let mut tasks = Vec::new();
        for slot in table.slots.values_mut() {
            if slot.cancel_live() {
                slot.state = ScheduleState::Stopped;
            }
            tasks.extend(slot.draining.take());
        }
        tasks
    }

    pub fn state(&self, key: &ScheduleKey) -> ScheduleState {
        self.lock()
            .slots
            .get(key)
            .map(|slot| slot.state)
            .unwrap_or(ScheduleState::Idle)
    }

    /// Keys with a live chain, sorted.
    pub fn active_keys(&self) -> Vec<ScheduleKey> {
        let table = self.lock();
        let mut keys: Vec<_> = table
            .slots
            .iter()
            .filter(|(_, slot)| slot.live.is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}
