//! Time source used by every loop in the crate.
//!
//! Control loops never call the runtime's timer directly. They go through a
//! [`Clock`] so the same loop code runs on the V5 Brain ([`VexClock`]) and
//! under a simulated clock in tests.

use std::{future::Future, time::Duration};

/// A monotonic clock with an async delay.
pub trait Clock {
    /// Time since the user program started.
    fn now(&self) -> Duration;

    /// Suspends the calling task for `duration`.
    ///
    /// This is the only place the control loops yield to other tasks.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// The V5 Brain's user-program clock.
#[cfg(target_os = "vexos")]
#[derive(Debug, Clone, Copy, Default)]
pub struct VexClock;

#[cfg(target_os = "vexos")]
impl Clock for VexClock {
    fn now(&self) -> Duration { vexide::time::user_uptime() }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        vexide::time::sleep(duration)
    }
}
