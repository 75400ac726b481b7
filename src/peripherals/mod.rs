//! Actuator and sensor capabilities consumed by the control core.
//!
//! The motion executor, velocity holder and shooter are written against these
//! traits rather than concrete vexide devices. Implementations for V5
//! hardware live in [`drivetrain`] and [`vex`] and are only built for VEXos.
//!
//! All methods take `&self`: device handles are cheap clones sharing the
//! underlying motors, the same way a [`Differential`](drivetrain::Differential)
//! shares its motor groups between the PID loops and the supervisor.
//!
//! Efforts are normalized to `[-1.0, 1.0]`. Hardware implementations scale
//! them to motor voltage.

use crate::error::DeviceError;

/// Differential drivetrain built from two V5 motor groups.
#[cfg(target_os = "vexos")]
pub mod drivetrain;

/// Flywheel, intake and indexer bindings for V5 devices.
#[cfg(target_os = "vexos")]
pub mod vex;

/// Motor behavior when no effort is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrakeMode {
    /// Motors spin down freely.
    #[default]
    Coast,
    /// Motors short their windings to stop quickly.
    Brake,
    /// Motors actively hold their position.
    Hold,
}

/// A chassis with independently driven left and right sides.
pub trait Chassis {
    /// Applies normalized efforts to the left and right sides.
    fn set_efforts(&self, left: f64, right: f64) -> Result<(), DeviceError>;

    /// Selects what the motors do when effort is zero.
    fn set_brake_mode(&self, mode: BrakeMode) -> Result<(), DeviceError>;

    /// Stops both sides immediately using the current brake mode.
    fn stop(&self) -> Result<(), DeviceError> { self.set_efforts(0.0, 0.0) }
}

/// The launcher as seen by the shooter: a target speed and a readiness flag.
pub trait Launcher {
    /// Requests a new target speed. Never blocks.
    fn set_velocity(&self, target: f64);

    /// Whether the launcher is currently within its tolerance band.
    fn at_target_velocity(&self) -> bool;
}

/// The motor group spinning the launcher flywheel.
pub trait FlywheelMotor {
    /// Measured flywheel speed, in the same unit as the velocity target.
    fn velocity(&self) -> Result<f64, DeviceError>;

    /// Applies a normalized effort.
    fn set_effort(&self, effort: f64) -> Result<(), DeviceError>;
}

/// The pneumatic indexer gating discs into the launcher.
pub trait Indexer {
    fn set_open(&self, open: bool) -> Result<(), DeviceError>;
}

/// The intake/feeder roller.
pub trait Intake {
    /// Applies a normalized effort in `[-1.0, 1.0]`.
    fn set_effort(&self, effort: f64) -> Result<(), DeviceError>;
}

/// Something the supervisor can force to a safe stop.
pub trait Halt {
    /// Name used in log output.
    fn name(&self) -> &'static str;

    /// Forces the mechanism to stop. Must not block.
    fn halt(&self) -> Result<(), DeviceError>;
}

/// Averages the readings of a device group.
///
/// Failed devices are left out of the average. The group only fails when no
/// device reads, reporting the first failure, or [`DeviceError::Io`] for an
/// empty group.
#[cfg_attr(not(target_os = "vexos"), allow(dead_code))]
pub(crate) fn group_average<I>(readings: I) -> Result<f64, DeviceError>
where
    I: IntoIterator<Item = Result<f64, DeviceError>>,
{
    let mut sum = 0.0;
    let mut count = 0u32;
    let mut failure = None;
    for reading in readings {
        match reading {
            Ok(value) => {
                sum += value;
                count += 1;
            }
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }
    if count == 0 {
        return Err(failure.unwrap_or(DeviceError::Io));
    }
    Ok(sum / f64::from(count))
}
