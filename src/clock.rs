//! Wall-clock and process CPU-time measurement for a run.

use std::io;
use std::time::{Duration, Instant};

const MICROS_PER_SEC: u128 = 1_000_000;

/// CPU time consumed so far by all threads of this process.
pub fn process_cpu_time() -> io::Result<Duration> {
    // SAFETY: timespec is plain integers, so all-zero is a valid value.
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

/// Start readings for both clocks.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    wall: Instant,
    cpu: Duration,
}

impl Stopwatch {
    pub fn start() -> io::Result<Self> {
        Ok(Self {
            wall: Instant::now(),
            cpu: process_cpu_time()?,
        })
    }

    /// `(wall, cpu)` time since [`start`](Self::start).
    pub fn elapsed(&self) -> io::Result<(Duration, Duration)> {
        let wall = self.wall.elapsed();
        let cpu = process_cpu_time()?.saturating_sub(self.cpu);
        Ok((wall, cpu))
    }
}

/// Seconds with microsecond precision, e.g. `1.002003`.
pub fn format_seconds(d: Duration) -> String {
    let micros = d.as_micros();
    format!(
        "{}.{:06}",
        micros / MICROS_PER_SEC,
        micros % MICROS_PER_SEC
    )
}
