#![forbid(unsafe_code)]

//! Cooperative cancellation for background work.
//!
//! A [`CancelToken`] is shared between the side that may give up on a piece of
//! work (usually because a deadline passed) and the worker doing it. The
//! worker checks [`CancelToken::is_cancelled`] at its own checkpoints, or
//! sleeps with [`CancelToken::wait_timeout`] so it wakes as soon as the token
//! fires.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Shared cancellation flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every waiter. Idempotent.
    pub fn cancel(&self) {
        let (_, cvar) = &*self.inner;
        let mut cancelled = self.lock();
        *cancelled = true;
        cvar.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Wait for cancellation or a timeout.
    ///
    /// Returns `true` if cancelled, `false` if the timeout elapsed first.
    /// Spurious wakeups are absorbed.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (_, cvar) = &*self.inner;
        let mut cancelled = self.lock();
        let deadline = Instant::now() + duration;
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = cvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_clear() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let worker = token.clone();
        token.cancel();
        assert!(worker.is_cancelled());
    }

    #[test]
    fn wait_times_out_when_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn wait_wakes_on_cancel() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            trigger.cancel();
        });
        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }
}
