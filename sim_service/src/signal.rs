//! Condvar-backed completion signal.

use std::sync::{Condvar, Mutex};
use trap_api::CompletionSignal;

/// A manual-reset event.
#[derive(Debug, Default)]
pub struct EventSignal {
    set: Mutex<bool>,
    changed: Condvar,
}

impl EventSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        // A panicking test thread must not wedge every other waiter.
        self.set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CompletionSignal for EventSignal {
    fn wait(&self) {
        let mut set = self.lock();
        while !*set {
            set = self
                .changed
                .wait(set)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    fn is_signaled(&self) -> bool {
        *self.lock()
    }

    fn signal(&self) {
        *self.lock() = true;
        self.changed.notify_all();
    }

    fn reset(&self) {
        *self.lock() = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_returns_after_signal_from_other_thread() {
        let signal = Arc::new(EventSignal::new());
        let setter = Arc::clone(&signal);
        let handle = thread::spawn(move || setter.signal());

        signal.wait();
        assert!(signal.is_signaled());
        handle.join().unwrap();
    }

    #[test]
    fn test_reset_clears() {
        let signal = EventSignal::new();
        signal.signal();
        signal.reset();
        assert!(!signal.is_signaled());
    }
}
