//! # BackOff
//!
//! Exponential backoff for the spin-protected counter.
//!
//! A thread that loses the race for a [`SpinLock`](crate::SpinLock) calls
//! [`BackOff::wait`] before retrying. Each call spins twice as long as the
//! previous one, up to [`MAX_SPIN`] iterations of [`core::hint::spin_loop`].
//! Once the spin count passes [`YIELD_THRESHOLD`] the thread also yields to
//! the scheduler, so heavy contention on an oversubscribed machine does not
//! starve the lock holder.
//!
//! ## Example
//! ```rust
//! use race_counter::BackOff;
//!
//! let backoff = BackOff::new();
//! let mut attempts = 0;
//! while attempts < 3 {
//!     attempts += 1;
//!     backoff.wait();
//! }
//! assert!(backoff.current() > 32);
//! ```

use core::{cell::Cell, hint::spin_loop};

/// Upper bound on spin iterations per wait.
pub const MAX_SPIN: u32 = 1 << 16;

/// Spin iterations of the first wait.
const START_VALUE: u32 = 1 << 4;

/// Spin count past which every wait also yields the thread.
pub const YIELD_THRESHOLD: u32 = 1 << 10;

/// Per-acquisition backoff state.
///
/// Not `Sync`: each contending thread builds its own on the stack.
pub struct BackOff {
    spin: Cell<u32>,
}

impl BackOff {
    /// Creates a backoff starting at the default spin count.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            spin: Cell::new(START_VALUE),
        }
    }

    /// Spins for the current count, then doubles it.
    ///
    /// Yields the thread when the count has grown past [`YIELD_THRESHOLD`].
    #[inline(always)]
    pub fn wait(&self) {
        let end = self.spin.get();

        for _ in 0..end {
            spin_loop();
        }

        self.spin.set((end << 1).min(MAX_SPIN));

        if end > YIELD_THRESHOLD {
            std::thread::yield_now();
        }
    }

    /// Current spin count.
    #[inline(always)]
    pub fn current(&self) -> u32 {
        self.spin.get()
    }

    /// Back to the starting spin count.
    #[inline(always)]
    pub fn reset(&self) {
        self.spin.set(START_VALUE);
    }
}

impl Default for BackOff {
    fn default() -> Self {
        Self::new()
    }
}
