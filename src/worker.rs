//! One counting worker: wait at the gate, increment, report.

use tracing::debug;

use crate::{CompletionTracker, SharedCounter, StartGate};

/// Everything a worker thread needs, borrowed from the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTask<'a> {
    pub id: usize,
    pub loops: u64,
    pub counter: &'a SharedCounter,
    pub gate: &'a StartGate,
    pub tracker: &'a CompletionTracker,
}

impl WorkerTask<'_> {
    /// Runs the worker to completion.
    ///
    /// Completion is reported to the tracker on every path out of this
    /// function, including an abandoned gate and a panic.
    pub fn run(self) {
        let guard = self.tracker.finish_guard();

        if !self.gate.wait() {
            debug!(worker = self.id, "start gate abandoned, exiting");
            return;
        }

        for _ in 0..self.loops {
            self.counter.increment();
        }

        let remaining = guard.finish();
        debug!(worker = self.id, remaining, "worker finishing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Protection;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_worker_holds_until_release() {
        let counter = SharedCounter::new(Protection::Mutex);
        let gate = StartGate::new();
        let tracker = CompletionTracker::with_tasks(1);

        thread::scope(|s| {
            let task = WorkerTask {
                id: 0,
                loops: 500,
                counter: &counter,
                gate: &gate,
                tracker: &tracker,
            };
            s.spawn(move || task.run());

            thread::sleep(Duration::from_millis(30));
            assert_eq!(counter.read(), 0, "worker incremented before release");
            assert_eq!(tracker.remaining(), 1);

            gate.release();
            tracker.wait_for_all();
        });

        assert_eq!(counter.read(), 500);
    }

    #[test]
    fn test_abandoned_worker_still_reports() {
        let counter = SharedCounter::new(Protection::Unprotected);
        let gate = StartGate::new();
        let tracker = CompletionTracker::with_tasks(2);

        thread::scope(|s| {
            for id in 0..2 {
                let task = WorkerTask {
                    id,
                    loops: 1_000,
                    counter: &counter,
                    gate: &gate,
                    tracker: &tracker,
                };
                s.spawn(move || task.run());
            }
            gate.abandon();
        });

        assert_eq!(tracker.remaining(), 0);
        assert_eq!(counter.read(), 0);
    }
}
