//! # SharedCounter
//!
//! The integer every worker increments, with a configurable [`Protection`].
//!
//! - [`Protection::Mutex`] guards each read-modify-write with a
//!   [`parking_lot::Mutex`]; contenders park instead of spinning.
//! - [`Protection::Spin`] guards it with the crate's [`SpinLock`].
//! - [`Protection::Unprotected`] performs the read and the write as two
//!   separate atomic operations. Another thread can store between them, so
//!   increments are lost exactly as with a plain `counter += 1` in C, but
//!   without undefined behaviour on the Rust side.
//!
//! Whatever the policy, the final value never exceeds the number of
//! increments performed: a lost update can only overwrite, never add.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

use parking_lot::Mutex;

use crate::SpinLock;

/// How [`SharedCounter::increment`] is synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Protection {
    /// Unsynchronized read-modify-write. Loses updates under contention.
    #[value(name = "none")]
    Unprotected,
    /// Blocking mutex around each increment.
    #[default]
    Mutex,
    /// Spin lock with exponential backoff around each increment.
    Spin,
}

impl Protection {
    /// Whether every increment is guaranteed to land.
    pub fn is_exact(self) -> bool {
        !matches!(self, Self::Unprotected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unprotected => "none",
            Self::Mutex => "mutex",
            Self::Spin => "spin",
        }
    }
}

/// `true` selects the mutex, `false` the unprotected path.
impl From<bool> for Protection {
    fn from(protected: bool) -> Self {
        if protected {
            Self::Mutex
        } else {
            Self::Unprotected
        }
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "unprotected" => Ok(Self::Unprotected),
            "mutex" => Ok(Self::Mutex),
            "spin" => Ok(Self::Spin),
            other => Err(format!("unknown protection '{other}'")),
        }
    }
}

enum Cell {
    Racy(AtomicU64),
    Locked(Mutex<u64>),
    Spin(SpinLock<u64>),
}

/// Counter shared by reference between the coordinator and all workers.
pub struct SharedCounter {
    cell: Cell,
}

impl SharedCounter {
    pub fn new(protection: Protection) -> Self {
        let cell = match protection {
            Protection::Unprotected => Cell::Racy(AtomicU64::new(0)),
            Protection::Mutex => Cell::Locked(Mutex::new(0)),
            Protection::Spin => Cell::Spin(SpinLock::new(0)),
        };
        Self { cell }
    }

    /// Same as `new(Protection::from(protected))`.
    pub fn protected(protected: bool) -> Self {
        Self::new(Protection::from(protected))
    }

    pub fn protection(&self) -> Protection {
        match self.cell {
            Cell::Racy(_) => Protection::Unprotected,
            Cell::Locked(_) => Protection::Mutex,
            Cell::Spin(_) => Protection::Spin,
        }
    }

    /// Adds one to the counter.
    ///
    /// The guard, when there is one, covers only this read-modify-write and
    /// is released on every exit path.
    #[inline]
    pub fn increment(&self) {
        match &self.cell {
            Cell::Racy(value) => {
                let current = value.load(Relaxed);
                value.store(current.wrapping_add(1), Relaxed);
            }
            Cell::Locked(value) => {
                let mut guard = value.lock();
                *guard = guard.wrapping_add(1);
            }
            Cell::Spin(value) => {
                let mut guard = value.lock();
                *guard = guard.wrapping_add(1);
            }
        }
    }

    /// Current value.
    ///
    /// Only a final tally once the [`CompletionTracker`](crate::CompletionTracker)
    /// has reported zero remaining workers; its lock orders every worker's
    /// stores before this load.
    pub fn read(&self) -> u64 {
        match &self.cell {
            Cell::Racy(value) => value.load(Relaxed),
            Cell::Locked(value) => *value.lock(),
            Cell::Spin(value) => *value.lock(),
        }
    }
}

impl Default for SharedCounter {
    fn default() -> Self {
        Self::new(Protection::default())
    }
}

impl fmt::Debug for SharedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCounter")
            .field("protection", &self.protection())
            .field("value", &self.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hammer(counter: &SharedCounter, threads: usize, loops: u64) {
        thread::scope(|s| {
            for _ in 0..threads {
                s.spawn(|| {
                    for _ in 0..loops {
                        counter.increment();
                    }
                });
            }
        });
    }

    #[test]
    fn test_bool_maps_to_policy() {
        assert_eq!(SharedCounter::protected(true).protection(), Protection::Mutex);
        assert_eq!(
            SharedCounter::protected(false).protection(),
            Protection::Unprotected
        );
    }

    #[test]
    fn test_single_thread_is_exact_for_every_policy() {
        for protection in [Protection::Unprotected, Protection::Mutex, Protection::Spin] {
            let counter = SharedCounter::new(protection);
            for _ in 0..1_000 {
                counter.increment();
            }
            assert_eq!(counter.read(), 1_000, "{protection}");
        }
    }

    #[test]
    fn test_guarded_policies_never_lose_updates() {
        for protection in [Protection::Mutex, Protection::Spin] {
            let counter = SharedCounter::new(protection);
            hammer(&counter, 4, 20_000);
            assert_eq!(counter.read(), 80_000, "{protection}");
        }
    }

    #[test]
    fn test_unprotected_never_gains() {
        let counter = SharedCounter::new(Protection::Unprotected);
        hammer(&counter, 4, 20_000);
        let value = counter.read();
        assert!(value >= 1 && value <= 80_000, "got {value}");
    }

    #[test]
    fn test_protection_parses_from_cli_names() {
        assert_eq!("none".parse::<Protection>(), Ok(Protection::Unprotected));
        assert_eq!("Mutex".parse::<Protection>(), Ok(Protection::Mutex));
        assert_eq!("spin".parse::<Protection>(), Ok(Protection::Spin));
        assert!("atomic".parse::<Protection>().is_err());
        assert_eq!(Protection::Unprotected.to_string(), "none");
    }
}
