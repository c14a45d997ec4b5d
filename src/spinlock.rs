//! # SpinLock
//!
//! Test-and-set lock behind [`Protection::Spin`](crate::Protection::Spin).
//!
//! The counter's spin regime exists to compare a busy-waiting guard against
//! the parked [`parking_lot::Mutex`] on the same read-modify-write. It is
//! only ever held for a single increment. The start gate and the completion
//! tracker never spin.
//!
//! ## Example
//! ```rust
//! use race_counter::SpinLock;
//!
//! let lock = SpinLock::new(0u64);
//! {
//!     let mut value = lock.lock();
//!     *value += 1;
//! } // released here
//! assert_eq!(*lock.lock(), 1);
//! ```

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{
    AtomicBool,
    Ordering::{Acquire, Relaxed, Release},
};

use crate::BackOff;

/// Spin-based mutual exclusion around a `T`.
pub struct SpinLock<T> {
    data: UnsafeCell<T>,
    locked: AtomicBool,
}

/// Exclusive access to the locked value; unlocks on drop.
pub struct SpinGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Drop for SpinGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Release)
    }
}

impl<T> SpinLock<T> {
    #[inline(always)]
    pub const fn new(data: T) -> Self {
        SpinLock {
            data: UnsafeCell::new(data),
            locked: AtomicBool::new(false),
        }
    }

    /// Spins with [`BackOff`] until the lock is taken.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_, T> {
        let backoff = BackOff::new();
        while self.locked.swap(true, Acquire) {
            // Wait on plain loads so contenders don't bounce the cache line.
            while self.locked.load(Relaxed) {
                backoff.wait();
            }
        }

        SpinGuard { lock: self }
    }

    /// Takes the lock only if it is free right now.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T>> {
        if self.locked.swap(true, Acquire) {
            None
        } else {
            Some(SpinGuard { lock: self })
        }
    }

    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Acquire)
    }

    /// Consumes the lock and returns the value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T> Deref for SpinGuard<'_, T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        // SAFETY: the guard exists only while `locked` is held by this thread.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinGuard<'_, T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, and `&mut self` rules out a second borrow.
        unsafe { &mut *self.lock.data.get() }
    }
}

// SAFETY: access to `data` is serialized by `locked`.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}
