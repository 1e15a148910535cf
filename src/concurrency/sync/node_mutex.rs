//! `NodeMutex` — a small futex mutex that owns the data it guards.
//!
//! One of these sits in every node of a lock-coupled collection, so it is kept
//! to a single `AtomicU32` of state next to the data. There is no poisoning: a
//! panic while a guard is alive unlocks on unwind and the data stays usable.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU32, Ordering};

use crossbeam_utils::Backoff;

use super::{wait_on_u32, wake_one_u32};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// A blocking mutual-exclusion lock protecting a `T`.
///
/// # States
/// - 0: Unlocked
/// - 1: Locked, no waiters
/// - 2: Locked, waiters may be parked on the state word
pub struct NodeMutex<T> {
    state: AtomicU32,
    data: UnsafeCell<T>,
}

// Safety: access to `data` is serialized by `state`, so only `T: Send` is needed.
unsafe impl<T: Send> Send for NodeMutex<T> {}
unsafe impl<T: Send> Sync for NodeMutex<T> {}

impl<T> NodeMutex<T> {
    /// Creates an unlocked mutex holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires the mutex, blocking the current thread until it is able to do so.
    #[inline]
    pub fn lock(&self) -> NodeMutexGuard<'_, T> {
        if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.lock_contended();
        }
        NodeMutexGuard::new(self)
    }

    /// Attempts to acquire the mutex without blocking.
    #[inline]
    pub fn try_lock(&self) -> Option<NodeMutexGuard<'_, T>> {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| NodeMutexGuard::new(self))
    }

    /// Returns `true` if some thread currently holds the lock.
    ///
    /// The answer may be stale by the time it is observed.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != UNLOCKED
    }

    /// Mutable access without locking; `&mut self` already proves exclusivity.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consumes the mutex and returns the protected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    #[cold]
    fn lock_contended(&self) {
        let mut state = self.spin();

        if state == UNLOCKED {
            match self
                .state
                .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(s) => state = s,
            }
        }

        loop {
            // Once we have slept we cannot know whether others still wait, so
            // the lock is always taken in the contended state from here on.
            if state != CONTENDED && self.state.swap(CONTENDED, Ordering::Acquire) == UNLOCKED {
                return;
            }

            wait_on_u32(&self.state, CONTENDED);

            state = self.spin();
        }
    }

    /// Spins (then yields) while the lock is held uncontended, returning the
    /// last seen state.
    fn spin(&self) -> u32 {
        let backoff = Backoff::new();
        loop {
            let state = self.state.load(Ordering::Relaxed);
            if state != LOCKED || backoff.is_completed() {
                return state;
            }
            backoff.snooze();
        }
    }

    /// Releases the lock.
    ///
    /// # Safety
    ///
    /// This must only be called by the holder of the lock, exactly once per
    /// acquisition. `NodeMutexGuard`'s `Drop` is the only caller.
    #[inline]
    unsafe fn unlock(&self) {
        if self.state.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            wake_one_u32(&self.state);
        }
    }
}

impl<T: Default> Default for NodeMutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for NodeMutex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeMutex")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// A guard that provides access to the data protected by a `NodeMutex`.
///
/// The lock is released when the guard is dropped, including during unwinding.
#[must_use = "if unused the NodeMutex will immediately unlock"]
pub struct NodeMutexGuard<'a, T> {
    lock: &'a NodeMutex<T>,
    // Not `Send`, and `Sync` only through the impl below.
    _not_send: PhantomData<*const ()>,
}

// Safety: sharing the guard only hands out `&T`.
unsafe impl<T: Sync> Sync for NodeMutexGuard<'_, T> {}

impl<'a, T> NodeMutexGuard<'a, T> {
    #[inline]
    fn new(lock: &'a NodeMutex<T>) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }
}

impl<T> Deref for NodeMutexGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: We hold the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for NodeMutexGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: We hold the lock, so we have exclusive access.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for NodeMutexGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: a guard exists only for a successful acquisition.
        unsafe {
            self.lock.unlock();
        }
    }
}
