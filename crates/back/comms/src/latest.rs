//! Single-slot mailbox that always holds the most recently published value

use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Everything the lock protects
struct Slot<T> {
    value: T,
    /// Set by `publish`, cleared by `take`
    fresh: bool,
    /// Set once by `stop`, never cleared
    stopped: bool,
}

/// Most-recent-wins hand-off between one producer and any number of readers.
///
/// There is no queue: publishing overwrites whatever was there, consumed or not. Readers block in
/// `take()` until something new is published or the producer announces that it has stopped.
/// Freshness is shared, so when several readers are waiting, the first one to wake up gets the
/// new value and the rest keep waiting for the next one.
pub struct Latest<T> {
    slot: Mutex<Slot<T>>,
    cond: Condvar,
}

impl<T: Clone> Latest<T> {
    /// Create a mailbox holding `initial`, which is not considered fresh.
    pub fn new(initial: T) -> Latest<T> {
        Latest {
            slot: Mutex::new(Slot { value: initial, fresh: false, stopped: false }),
            cond: Condvar::new(),
        }
    }

    // a reader that panicked while holding the lock cannot have left the slot half-written
    fn lock(&self) -> MutexGuard<Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the stored value, mark it fresh and wake every waiting reader.
    pub fn publish(&self, value: T) {
        let old = {
            let mut slot = self.lock();
            slot.fresh = true;
            mem::replace(&mut slot.value, value)
        };
        self.cond.notify_all();
        drop(old); // outside the lock
    }

    /// Wait for a fresh value (or for the producer to stop) and return it.
    ///
    /// After `stop()`, this never blocks: it returns the stored value whether or not it has been
    /// consumed already. If nothing was ever published that is the initial value.
    pub fn take(&self) -> T {
        let mut slot = self.lock();
        while !slot.fresh && !slot.stopped {
            slot = self.cond.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
        slot.fresh = false;
        slot.value.clone()
    }

    /// Like `take()`, but gives up after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock();
        while !slot.fresh && !slot.stopped {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            slot = self.cond.wait_timeout(slot, deadline - now).unwrap_or_else(PoisonError::into_inner).0;
        }
        slot.fresh = false;
        Some(slot.value.clone())
    }

    /// Look at the stored value without consuming it.
    pub fn peek(&self) -> T {
        self.lock().value.clone()
    }

    pub fn is_fresh(&self) -> bool {
        self.lock().fresh
    }

    /// Tell all current and future readers that nothing more is coming.
    ///
    /// Calling this more than once is harmless. Publishing after a stop is still allowed (an
    /// in-flight acquisition may finish after it was asked to quit), and makes the value fresh.
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.cond.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}

impl<T: Clone + Default> Default for Latest<T> {
    fn default() -> Latest<T> {
        Latest::new(T::default())
    }
}
