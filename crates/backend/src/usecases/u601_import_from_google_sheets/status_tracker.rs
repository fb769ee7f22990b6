use chrono::{DateTime, Utc};
use contracts::usecases::u601_import_from_google_sheets::{ImportStatus, SyncPhase};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::timer_slot::TimerSlot;

#[derive(Debug, Clone, Default)]
struct TrackerState {
    status: ImportStatus,
    phase: SyncPhase,
    /// Bumped on every status message; a decay task only clears the
    /// messages of the generation it was armed for
    generation: u64,
}

/// In-memory import status with self-clearing messages.
///
/// `error` and `success` are mutually exclusive. Both are cleared
/// `decay_after` the last message was published; a newer message restarts
/// the countdown. The connected flag and `last_sync` never decay.
pub struct StatusTracker {
    state: Arc<RwLock<TrackerState>>,
    decay: TimerSlot,
    decay_after: Duration,
}

impl StatusTracker {
    pub fn new(decay_after: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(TrackerState::default())),
            decay: TimerSlot::new(),
            decay_after,
        }
    }

    pub fn status(&self) -> ImportStatus {
        self.read().status.clone()
    }

    pub fn phase(&self) -> SyncPhase {
        self.read().phase
    }

    pub fn is_connected(&self) -> bool {
        self.read().status.is_connected
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TrackerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<F>(&self, apply: F) -> ImportStatus
    where
        F: FnOnce(&mut TrackerState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
        state.status.clone()
    }

    /// Applies a change that sets a message and restarts the decay countdown
    fn publish<F>(&self, apply: F) -> ImportStatus
    where
        F: FnOnce(&mut TrackerState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
        state.generation += 1;
        let generation = state.generation;
        let status = state.status.clone();

        let shared = self.state.clone();
        let decay_after = self.decay_after;
        self.decay.rearm(async move {
            tokio::time::sleep(decay_after).await;
            let mut state = shared.write().unwrap_or_else(PoisonError::into_inner);
            if state.generation == generation {
                state.status.error = None;
                state.status.success = None;
                state.phase = SyncPhase::neutral(state.status.is_connected);
                tracing::debug!("Import status message cleared");
            }
        });
        status
    }

    /// Loading starts: previous messages and their countdown are dropped
    pub fn begin(&self, phase: SyncPhase) -> ImportStatus {
        let status = self.update(|state| {
            state.generation += 1;
            state.phase = phase;
            state.status.is_loading = true;
            state.status.error = None;
            state.status.success = None;
        });
        self.decay.cancel();
        status
    }

    pub fn connected(&self, message: String) -> ImportStatus {
        self.publish(|state| {
            state.phase = SyncPhase::Connected;
            state.status.is_connected = true;
            state.status.is_loading = false;
            state.status.error = None;
            state.status.success = Some(message);
        })
    }

    /// Connect failed; an earlier connection stays in place
    pub fn connect_failed(&self, message: String) -> ImportStatus {
        self.publish(|state| {
            state.phase = SyncPhase::neutral(state.status.is_connected);
            state.status.is_loading = false;
            state.status.success = None;
            state.status.error = Some(message);
        })
    }

    pub fn import_succeeded(&self, message: String, at: DateTime<Utc>) -> ImportStatus {
        self.publish(|state| {
            state.phase = SyncPhase::ImportSucceeded;
            state.status.is_loading = false;
            state.status.last_sync = Some(at);
            state.status.error = None;
            state.status.success = Some(message);
        })
    }

    pub fn import_failed(&self, message: String) -> ImportStatus {
        self.publish(|state| {
            state.phase = SyncPhase::ImportFailed;
            state.status.is_loading = false;
            state.status.success = None;
            state.status.error = Some(message);
        })
    }

    /// Request refused before any work started
    pub fn reject(&self, message: String) -> ImportStatus {
        self.publish(|state| {
            state.status.success = None;
            state.status.error = Some(message);
        })
    }

    pub fn disconnected(&self) -> ImportStatus {
        let status = self.update(|state| {
            state.generation += 1;
            state.phase = SyncPhase::Idle;
            state.status.is_connected = false;
            state.status.is_loading = false;
            state.status.error = None;
            state.status.success = None;
        });
        self.decay.cancel();
        status
    }

    pub fn shutdown(&self) {
        self.decay.cancel();
    }
}
