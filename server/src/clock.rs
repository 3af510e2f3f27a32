//! Wall-clock time source.

use simplyput_engine::{TimeSource, Timestamp};

/// Reads the system clock in whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}
