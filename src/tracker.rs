//! # CompletionTracker
//!
//! Counts workers still running and wakes the coordinator when the last one
//! finishes.
//!
//! The decrement and the zero check happen under one lock acquisition, so
//! exactly one caller observes the transition to zero. "All done" is the
//! stored `remaining == 0`, not a one-off signal: a coordinator that starts
//! waiting after every worker is already gone returns at once.
//!
//! Workers normally report through a [`FinishGuard`], which calls
//! [`CompletionTracker::task_finished`] on drop, unwinding included.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct CompletionTracker {
    remaining: Mutex<usize>,
    all_done: Condvar,
}

impl CompletionTracker {
    /// A tracker with nothing registered; `wait_for_all` returns at once.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(n: usize) -> Self {
        let tracker = Self::new();
        tracker.register(n);
        tracker
    }

    /// Sets the number of workers to wait for. Call before any worker starts.
    pub fn register(&self, n: usize) {
        *self.remaining.lock() = n;
    }

    /// Reports one worker as finished and returns how many remain.
    ///
    /// The call that brings the count to zero wakes the waiter.
    pub fn task_finished(&self) -> usize {
        let mut remaining = self.remaining.lock();
        debug_assert!(*remaining > 0, "more workers finished than registered");
        *remaining = remaining.saturating_sub(1);
        let left = *remaining;
        drop(remaining);

        if left == 0 {
            self.all_done.notify_all();
        }
        left
    }

    /// Returns a guard that reports completion when dropped.
    pub fn finish_guard(&self) -> FinishGuard<'_> {
        FinishGuard {
            tracker: self,
            finished: None,
        }
    }

    /// Blocks until every registered worker has finished.
    pub fn wait_for_all(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.all_done.wait(&mut remaining);
        }
    }

    /// Like [`wait_for_all`](Self::wait_for_all) with a deadline. Returns
    /// `false` if workers were still running when it expired.
    pub fn wait_for_all_timeout(&self, timeout: Duration) -> bool {
        let mut remaining = self.remaining.lock();
        let result = self
            .all_done
            .wait_while_for(&mut remaining, |remaining| *remaining > 0, timeout);
        !result.timed_out() || *remaining == 0
    }

    /// Snapshot for diagnostics.
    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }
}

/// Scoped completion report for one worker.
pub struct FinishGuard<'a> {
    tracker: &'a CompletionTracker,
    finished: Option<usize>,
}

impl FinishGuard<'_> {
    /// Reports completion now and returns how many workers remain.
    pub fn finish(mut self) -> usize {
        let left = self.tracker.task_finished();
        self.finished = Some(left);
        left
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if self.finished.is_none() {
            self.tracker.task_finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_empty_tracker_does_not_block() {
        let tracker = CompletionTracker::new();
        tracker.wait_for_all();
        assert_eq!(tracker.remaining(), 0);
    }

    #[test]
    fn test_late_waiter_sees_completion() {
        let tracker = CompletionTracker::with_tasks(3);

        thread::scope(|s| {
            for _ in 0..3 {
                s.spawn(|| {
                    tracker.task_finished();
                });
            }
        });

        // Every worker is joined; the wake already happened.
        let start = Instant::now();
        assert!(tracker.wait_for_all_timeout(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_exactly_one_caller_reaches_zero() {
        let tracker = CompletionTracker::with_tasks(64);
        let zero_hits = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..64 {
                s.spawn(|| {
                    if tracker.task_finished() == 0 {
                        zero_hits.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
            tracker.wait_for_all();
        });

        assert_eq!(zero_hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_timeout_reports_pending_workers() {
        let tracker = CompletionTracker::with_tasks(2);
        tracker.task_finished();
        assert!(!tracker.wait_for_all_timeout(Duration::from_millis(20)));
        assert_eq!(tracker.remaining(), 1);
    }

    #[test]
    fn test_guard_reports_once() {
        let tracker = CompletionTracker::with_tasks(2);
        let guard = tracker.finish_guard();
        assert_eq!(guard.finish(), 1);
        drop(tracker.finish_guard());
        assert_eq!(tracker.remaining(), 0);
    }

    #[test]
    fn test_guard_reports_on_panic() {
        let tracker = CompletionTracker::with_tasks(1);

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = tracker.finish_guard();
            panic!("worker blew up");
        }));

        assert!(result.is_err());
        assert!(tracker.wait_for_all_timeout(Duration::from_secs(1)));
    }
}
