//! Turn timer
//!
//! Holds the "is it my turn" flag and at most one pending wake-up that sets
//! it. The flag, the pending task and the wake-up deadline share one lock;
//! the wake-up task takes the same lock before writing the flag.
//!
//! Every arming bumps a generation counter. A wake-up that lost the race
//! against a rearm (it was already past its sleep when aborted) sees a newer
//! generation and leaves the flag alone.

use crate::metrics;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Default)]
struct TurnState {
    is_turn: bool,
    pending: Option<JoinHandle<()>>,
    generation: u64,
    deadline: Option<Instant>,
}

impl TurnState {
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.deadline = None;
    }
}

/// Single-pending-timer turn flag.
pub struct TurnTimer {
    state: Arc<Mutex<TurnState>>,
    runtime: Handle,
}

impl TurnTimer {
    /// Create a timer whose wake-ups run on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            state: Arc::new(Mutex::new(TurnState::default())),
            runtime,
        }
    }

    /// Take the lock for a compound operation.
    pub fn lock(&self) -> TurnGuard<'_> {
        TurnGuard {
            state: self.state.lock(),
            shared: &self.state,
            runtime: &self.runtime,
        }
    }

    /// Cancel any pending wake-up, clear the flag and schedule a new one.
    pub fn rearm(&self, delay_ms: u64) {
        self.lock().rearm(delay_ms);
    }

    /// Atomically read and clear the flag.
    pub fn consume(&self) -> bool {
        self.lock().consume()
    }

    /// Cancel any pending wake-up and set the flag.
    pub fn open_now(&self) {
        self.lock().open_now();
    }

    pub fn is_turn(&self) -> bool {
        self.state.lock().is_turn
    }

    /// When the pending wake-up fires, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.state.lock().deadline
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.state.lock().cancel_pending();
    }
}

/// Exclusive access to the turn state.
pub struct TurnGuard<'a> {
    state: MutexGuard<'a, TurnState>,
    shared: &'a Arc<Mutex<TurnState>>,
    runtime: &'a Handle,
}

impl TurnGuard<'_> {
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.state.is_turn)
    }

    pub fn is_turn(&self) -> bool {
        self.state.is_turn
    }

    pub fn rearm(&mut self, delay_ms: u64) {
        self.state.cancel_pending();
        self.state.is_turn = false;
        self.state.generation += 1;

        let generation = self.state.generation;
        let Some(deadline) = Instant::now().checked_add(Duration::from_millis(delay_ms)) else {
            warn!(delay_ms, generation, "Turn delay out of clock range, timer not armed");
            return;
        };
        let shared = Arc::clone(self.shared);

        let handle = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut state = shared.lock();
            if state.generation != generation {
                return;
            }
            state.is_turn = true;
            state.pending = None;
            state.deadline = None;
            metrics::record_turn_opened();
            debug!(generation, "Turn window opened by timer");
        });

        self.state.pending = Some(handle);
        self.state.deadline = Some(deadline);
        debug!(delay_ms, generation, "Turn timer armed");
    }

    pub fn open_now(&mut self) {
        self.state.cancel_pending();
        self.state.generation += 1;
        if !self.state.is_turn {
            self.state.is_turn = true;
            metrics::record_turn_opened();
        }
    }
}
