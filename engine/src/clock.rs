//! Time sources for the server-managed timestamps.
//!
//! Record operations never read a global clock. They ask the injected
//! [`TimeSource`], so tests can pin `_created` and `_updated`.

use crate::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};

/// Supplies the current time in whole seconds since the Unix epoch.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// A time source that returns a settable, fixed instant.
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    seconds: AtomicI64,
}

impl FixedTimeSource {
    /// Create a time source pinned at `seconds`.
    pub fn new(seconds: Timestamp) -> Self {
        Self {
            seconds: AtomicI64::new(seconds),
        }
    }

    /// Move the pinned instant.
    pub fn set(&self, seconds: Timestamp) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }

    /// Move the pinned instant forward.
    pub fn advance(&self, seconds: Timestamp) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.seconds.load(Ordering::SeqCst)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fixed_source_returns_pinned_time() {
        let clock = FixedTimeSource::new(1_700_000_000);
        assert_eq!(clock.now(), 1_700_000_000);
        assert_eq!(clock.now(), 1_700_000_000);
    }

    #[test]
    fn set_and_advance() {
        let clock = FixedTimeSource::new(10);
        clock.advance(5);
        assert_eq!(clock.now(), 15);
        clock.set(100);
        assert_eq!(clock.now(), 100);
    }

    #[test]
    fn shared_source_sees_updates() {
        let clock = Arc::new(FixedTimeSource::new(1));
        let shared: Arc<dyn TimeSource> = clock.clone();
        clock.advance(1);
        assert_eq!(shared.now(), 2);
    }
}
