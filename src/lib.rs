//! # race-counter
//!
//! N worker threads increment one shared counter, either unguarded (and so
//! losing updates to read-modify-write races) or guarded so that the final
//! count is always `threads * loops_per_thread`.
//!
//! The interesting part is the lifecycle around the counter:
//!
//! - [`StartGate`] parks every worker until the coordinator opens it, so
//!   they really contend instead of starting one after another.
//! - [`CompletionTracker`] counts workers down to zero; the last one wakes
//!   the coordinator, and a coordinator that arrives late still sees zero.
//! - [`SharedCounter`] applies the selected [`Protection`] to each increment.
//!
//! No component busy-waits except the optional [`SpinLock`] protection,
//! and that only inside a single increment.
//!
//! ## Quick example
//!
//! ```rust
//! use race_counter::{run, Protection};
//!
//! let guarded = run(4, 10_000, Protection::Mutex).unwrap();
//! assert_eq!(guarded.actual, guarded.expected);
//!
//! let racy = run(4, 10_000, Protection::Unprotected).unwrap();
//! assert!(racy.actual <= racy.expected);
//! ```
//!
//! ## Modules
//!
//! - [`counter`] — the counter and its protection policies.
//! - [`gate`] — one-shot start barrier.
//! - [`tracker`] — completion countdown with persistent "all done" state.
//! - [`worker`] — the per-thread task.
//! - [`coordinator`] — runs everything and produces a [`RunReport`].
//! - [`clock`] — wall and process CPU time.
//! - [`spinlock`], [`backoff`] — the spin protection.

pub mod backoff;
pub mod clock;
pub mod coordinator;
pub mod counter;
pub mod error;
pub mod gate;
pub mod spinlock;
pub mod tracker;
pub mod worker;

pub use backoff::BackOff;
pub use coordinator::{run, Coordinator, RunConfig, RunReport};
pub use counter::{Protection, SharedCounter};
pub use error::{RaceError, Result};
pub use gate::StartGate;
pub use spinlock::SpinLock;
pub use tracker::{CompletionTracker, FinishGuard};
pub use worker::WorkerTask;
