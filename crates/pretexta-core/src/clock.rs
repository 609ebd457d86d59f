//! Time source seam.

use chrono::{DateTime, Utc};

/// Supplies the timestamps stamped on events and traversal steps; tests
/// swap in a fixed implementation.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation the running server uses.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
