//! # StartGate
//!
//! One-shot barrier that holds every worker until the coordinator opens it,
//! so all workers hit the counter together instead of in staggered starts.
//!
//! Waiters park on a [`parking_lot::Condvar`]; nothing polls the state.
//! The state only moves forward, out of `Closed`, and it moves once.
//!
//! ## Example
//! ```rust
//! use race_counter::StartGate;
//! use std::thread;
//!
//! let gate = StartGate::new();
//! thread::scope(|s| {
//!     let waiter = s.spawn(|| gate.wait());
//!     gate.release();
//!     assert!(waiter.join().unwrap());
//! });
//! ```

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    /// The run was called off before release; waiters leave without working.
    Abandoned,
}

#[derive(Debug)]
pub struct StartGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl StartGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            cond: Condvar::new(),
        }
    }

    /// Blocks until the gate is opened or abandoned.
    ///
    /// Returns `true` if the caller should go on to do its work, `false` if
    /// the gate was abandoned.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while *state == GateState::Closed {
            self.cond.wait(&mut state);
        }
        *state == GateState::Open
    }

    /// Opens the gate and wakes every waiter.
    ///
    /// Must be called at most once per gate.
    pub fn release(&self) {
        self.transition(GateState::Open);
    }

    /// Wakes every waiter with a refusal. Used when the run fails before
    /// release, so spawned workers can exit instead of blocking forever.
    pub fn abandon(&self) {
        self.transition(GateState::Abandoned);
    }

    pub fn is_released(&self) -> bool {
        *self.state.lock() == GateState::Open
    }

    fn transition(&self, to: GateState) {
        let mut state = self.state.lock();
        debug_assert_eq!(*state, GateState::Closed, "start gate used twice");
        *state = to;
        drop(state);
        self.cond.notify_all();
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}
