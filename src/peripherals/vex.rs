//! Launcher-side V5 devices.
//!
//! ```ignore
//! use talos::peripherals::vex::{Flywheel, MotorIntake, PneumaticIndexer};
//! use vexide::prelude::*;
//!
//! let flywheel = Flywheel::new([
//!     Motor::new(peripherals.port_7, Gearset::Blue, Direction::Forward),
//!     Motor::new(peripherals.port_8, Gearset::Blue, Direction::Reverse),
//! ]);
//! let intake = MotorIntake::new([Motor::new(peripherals.port_9, Gearset::Green, Direction::Forward)]);
//! let indexer = PneumaticIndexer::new(AdiDigitalOut::new(peripherals.adi_a));
//! ```

use std::{cell::RefCell, rc::Rc};

use log::warn;
use vexide::{
    adi::digital::AdiDigitalOut,
    smart::{SmartDevice, motor::Motor},
};

use super::{FlywheelMotor, Halt, Indexer, Intake, group_average};
use crate::error::DeviceError;

/// Maximum motor voltage. Normalized efforts are scaled by this.
pub const MAX_VOLTAGE: f64 = 12.0;

/// Classifies a failed access to a smart device.
pub(crate) fn classify<D: SmartDevice>(device: &D) -> DeviceError {
    if device.is_connected() {
        DeviceError::Io
    } else {
        DeviceError::Disconnected
    }
}

/// Applies `effort` to every motor in the group, reporting the first failure.
pub(crate) fn set_group_effort(group: &RefCell<dyn AsMut<[Motor]>>, effort: f64) -> Result<(), DeviceError> {
    let mut motors = group.try_borrow_mut().map_err(|_| DeviceError::NotReady)?;
    let mut result = Ok(());
    for motor in motors.as_mut() {
        if motor.set_voltage(effort * MAX_VOLTAGE).is_err() && result.is_ok() {
            result = Err(classify(&*motor));
        }
    }
    result
}

/// The motor group spinning the launcher flywheel. Speeds are in RPM.
#[derive(Clone)]
pub struct Flywheel {
    pub motors: Rc<RefCell<dyn AsMut<[Motor]>>>,
}

impl Flywheel {
    pub fn new<M: AsMut<[Motor]> + 'static>(motors: M) -> Self {
        Self {
            motors: Rc::new(RefCell::new(motors)),
        }
    }
}

impl FlywheelMotor for Flywheel {
    /// Average velocity of the motors that respond.
    fn velocity(&self) -> Result<f64, DeviceError> {
        let mut motors = self.motors.try_borrow_mut().map_err(|_| DeviceError::NotReady)?;
        group_average(motors.as_mut().iter().map(|motor| {
            motor.velocity().map_err(|e| {
                warn!("Flywheel Motor Velocity Error: {}", e);
                classify(motor)
            })
        }))
    }

    fn set_effort(&self, effort: f64) -> Result<(), DeviceError> { set_group_effort(&self.motors, effort) }
}

impl Halt for Flywheel {
    fn name(&self) -> &'static str { "flywheel" }

    fn halt(&self) -> Result<(), DeviceError> { set_group_effort(&self.motors, 0.0) }
}

/// A motor-driven intake roller.
#[derive(Clone)]
pub struct MotorIntake {
    pub motors: Rc<RefCell<dyn AsMut<[Motor]>>>,
}

impl MotorIntake {
    pub fn new<M: AsMut<[Motor]> + 'static>(motors: M) -> Self {
        Self {
            motors: Rc::new(RefCell::new(motors)),
        }
    }
}

impl Intake for MotorIntake {
    fn set_effort(&self, effort: f64) -> Result<(), DeviceError> {
        set_group_effort(&self.motors, effort.clamp(-1.0, 1.0))
    }
}

impl Halt for MotorIntake {
    fn name(&self) -> &'static str { "intake" }

    fn halt(&self) -> Result<(), DeviceError> { set_group_effort(&self.motors, 0.0) }
}

/// An indexer driven by a single-acting pneumatic cylinder.
#[derive(Clone)]
pub struct PneumaticIndexer {
    pub valve: Rc<RefCell<AdiDigitalOut>>,
}

impl PneumaticIndexer {
    pub fn new(valve: AdiDigitalOut) -> Self {
        Self {
            valve: Rc::new(RefCell::new(valve)),
        }
    }
}

impl Indexer for PneumaticIndexer {
    fn set_open(&self, open: bool) -> Result<(), DeviceError> {
        let mut valve = self.valve.try_borrow_mut().map_err(|_| DeviceError::NotReady)?;
        let result = if open { valve.set_high() } else { valve.set_low() };
        result.map_err(|e| {
            warn!("Indexer Error: {}", e);
            DeviceError::Io
        })
    }
}
