//! Error types shared by the control loops.
//!
//! Two layers are distinguished:
//!
//! - [`DeviceError`]: a single read or write against a device failed. Loops
//!   treat these as transient and skip the tick.
//! - [`Fault`]: a condition that makes the autonomous routine unsafe to
//!   continue. Faults are raised into a [`FaultSlot`] and acted upon by the
//!   [`Supervisor`](crate::supervisor::Supervisor), which halts every actuator.

use std::time::Duration;

use crate::sync::Latest;

/// Failure of a single device access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The device is unplugged or not responding on its port.
    #[error("device disconnected")]
    Disconnected,
    /// The device is present but cannot report yet (e.g. IMU calibrating).
    #[error("device not ready")]
    NotReady,
    /// Any other device-level failure.
    #[error("device I/O failure")]
    Io,
}

/// A fatal condition that aborts the autonomous routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// The heading sensor disconnected while the pose estimator was running.
    #[error("heading sensor lost")]
    HeadingSensorLost,
    /// A background loop stopped producing successful ticks.
    #[error("{task} loop has been silent for {}", humantime::format_duration(*.silent_for))]
    Stale {
        /// Name of the loop that went quiet.
        task:       &'static str,
        /// How long it has been since its last successful tick.
        silent_for: Duration,
    },
}

/// One-slot cell holding the first fault raised by any loop.
///
/// Later faults do not overwrite an earlier one; the first cause is the one
/// reported by the supervisor.
#[derive(Clone, Default)]
pub struct FaultSlot(Latest<Option<Fault>>);

impl FaultSlot {
    pub fn new() -> Self { Self::default() }

    /// Records `fault` unless a fault is already pending.
    pub fn raise(&self, fault: Fault) {
        if self.0.get().is_none() {
            self.0.set(Some(fault));
        }
    }

    /// Returns the pending fault, if any.
    pub fn pending(&self) -> Option<Fault> { self.0.get() }
}
