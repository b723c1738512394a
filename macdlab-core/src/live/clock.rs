//! Wall-clock seam for the live loop.
//!
//! All waiting in a worker is a blocking sleep local to that worker; routing
//! it through a trait lets integration tests run the loop on virtual time.

use std::time::Duration;

pub trait Clock {
    /// Current unix time in seconds.
    fn now(&self) -> i64;

    /// Block the current worker for `d`.
    fn sleep(&self, d: Duration);
}

/// Real time: `SystemTime` + `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}
