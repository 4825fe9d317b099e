//! Busy-wait gating before a command is written.

use std::thread;
use std::time::{Duration, Instant};

/// "Is the module busy?" check polled before each command.
///
/// Typically wraps a GPIO read of the module's BUSY pin. Any
/// `Fn() -> bool + Send + Sync` closure is a `BusyCheck`.
pub trait BusyCheck: Send + Sync {
    /// Return `true` while the module cannot accept a command.
    fn is_busy(&self) -> bool;
}

impl<F> BusyCheck for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_busy(&self) -> bool {
        self()
    }
}

/// Poll `check` every `interval` until it clears or `timeout` passes.
///
/// Returns `true` once the module is free.
pub(crate) fn wait_not_busy(check: &dyn BusyCheck, timeout: Duration, interval: Duration) -> bool {
    let started = Instant::now();
    loop {
        if !check.is_busy() {
            return true;
        }
        if started.elapsed() >= timeout {
            return false;
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_not_busy_returns_immediately() {
        let started = Instant::now();
        assert!(wait_not_busy(&|| false, Duration::from_millis(500), Duration::from_millis(10)));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_always_busy_times_out() {
        let started = Instant::now();
        assert!(!wait_not_busy(&|| true, Duration::from_millis(50), Duration::from_millis(5)));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_clears_after_a_few_polls() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let check = move || counter.fetch_add(1, Ordering::SeqCst) < 3;

        assert!(wait_not_busy(&check, Duration::from_millis(500), Duration::from_millis(1)));
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }
}
