//! # Coordinator
//!
//! Owns the shared objects of one run, spawns the workers, opens the gate
//! and blocks until the tracker reports that every worker has finished.
//!
//! Workers are scoped threads borrowing the counter, gate and tracker from
//! the coordinator's stack, so nothing outlives the run and nothing is global.
//!
//! ```rust
//! use race_counter::{run, Protection};
//!
//! let report = run(4, 1_000, Protection::Mutex).unwrap();
//! assert_eq!(report.actual, 4_000);
//! assert_eq!(report.expected, 4_000);
//! ```

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::{format_seconds, Stopwatch};
use crate::error::{RaceError, Result};
use crate::{CompletionTracker, Protection, SharedCounter, StartGate, WorkerTask};

/// Validated parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub threads: usize,
    pub loops_per_thread: u64,
    pub protection: Protection,
}

impl RunConfig {
    /// Checks `threads >= 1` and `loops >= 0`.
    pub fn new(threads: i64, loops: i64, protection: Protection) -> Result<Self> {
        let threads = usize::try_from(threads)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(RaceError::InvalidThreads(threads))?;
        let loops_per_thread = u64::try_from(loops).map_err(|_| RaceError::InvalidLoops(loops))?;

        Ok(Self {
            threads,
            loops_per_thread,
            protection,
        })
    }

    /// `threads * loops_per_thread`, saturating.
    pub fn expected(&self) -> u64 {
        (self.threads as u64).saturating_mul(self.loops_per_thread)
    }
}

/// Final tally and timings of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub actual: u64,
    pub expected: u64,
    pub elapsed: Duration,
    pub cpu_time: Duration,
    pub protection: Protection,
}

impl RunReport {
    pub fn is_exact(&self) -> bool {
        self.actual == self.expected
    }

    /// Increments that were overwritten by a racing worker.
    pub fn lost_updates(&self) -> u64 {
        self.expected.saturating_sub(self.actual)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total count, expected {}, time {}s, cpu time {}s",
            self.actual,
            self.expected,
            format_seconds(self.elapsed),
            format_seconds(self.cpu_time)
        )
    }
}

pub struct Coordinator {
    config: RunConfig,
    counter: SharedCounter,
    tracker: CompletionTracker,
    gate: StartGate,
}

impl Coordinator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            counter: SharedCounter::new(config.protection),
            tracker: CompletionTracker::with_tasks(config.threads),
            gate: StartGate::new(),
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs every worker to completion and returns the tally.
    ///
    /// A gate is single-use, so a coordinator runs once.
    pub fn run(self) -> Result<RunReport> {
        let Self {
            config,
            counter,
            tracker,
            gate,
        } = self;

        let (actual, elapsed, cpu_time) =
            thread::scope(|s| -> Result<(u64, Duration, Duration)> {
                for id in 0..config.threads {
                    let task = WorkerTask {
                        id,
                        loops: config.loops_per_thread,
                        counter: &counter,
                        gate: &gate,
                        tracker: &tracker,
                    };
                    let spawned = thread::Builder::new()
                        .name(format!("race-worker-{id}"))
                        .spawn_scoped(s, move || task.run());
                    if let Err(source) = spawned {
                        // Workers already spawned are parked at the gate.
                        gate.abandon();
                        return Err(RaceError::Spawn { id, source });
                    }
                    debug!(worker = id, spawned = id + 1, "spawned worker");
                }

                let watch = match Stopwatch::start() {
                    Ok(watch) => watch,
                    Err(e) => {
                        gate.abandon();
                        return Err(RaceError::Clock(e));
                    }
                };

                gate.release();
                tracker.wait_for_all();

                let (elapsed, cpu_time) = watch.elapsed().map_err(RaceError::Clock)?;
                Ok((counter.read(), elapsed, cpu_time))
            })?;

        let report = RunReport {
            actual,
            expected: config.expected(),
            elapsed,
            cpu_time,
            protection: config.protection,
        };

        info!(
            threads = config.threads,
            loops = config.loops_per_thread,
            protection = %config.protection,
            actual = report.actual,
            expected = report.expected,
            "run complete"
        );
        if !report.is_exact() {
            warn!(lost = report.lost_updates(), "increments were lost to the race");
        }

        Ok(report)
    }
}

/// Validates the parameters and performs one run.
pub fn run(threads: i64, loops_per_thread: i64, protection: Protection) -> Result<RunReport> {
    let config = RunConfig::new(threads, loops_per_thread, protection)?;
    Coordinator::new(config).run()
}
