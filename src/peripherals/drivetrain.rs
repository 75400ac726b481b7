//! Differential drivetrain.
//!
//! ```ignore
//! use talos::peripherals::drivetrain::Differential;
//! use vexide::prelude::*;
//!
//! let drivetrain = Differential::new(
//!     [
//!         Motor::new(peripherals.port_1, Gearset::Blue, Direction::Reverse),
//!         Motor::new(peripherals.port_2, Gearset::Blue, Direction::Reverse),
//!     ],
//!     [
//!         Motor::new(peripherals.port_3, Gearset::Blue, Direction::Forward),
//!         Motor::new(peripherals.port_4, Gearset::Blue, Direction::Forward),
//!     ],
//! );
//! ```

use std::{cell::RefCell, rc::Rc};

use vexide::smart::motor::{BrakeMode as MotorBrake, Motor};

use super::{
    BrakeMode, Chassis, Halt,
    vex::{classify, set_group_effort},
};
use crate::{error::DeviceError, sync::Latest};

/// A robot with separately driven left and right motor groups.
///
/// Clones share the motor groups, so the motion executor and the
/// supervisor can both hold one.
#[derive(Clone)]
pub struct Differential {
    /// The left side motor group.
    pub left:  Rc<RefCell<dyn AsMut<[Motor]>>>,
    /// The right side motor group.
    pub right: Rc<RefCell<dyn AsMut<[Motor]>>>,
    brake:     Latest<BrakeMode>,
}

impl Differential {
    pub fn new<L: AsMut<[Motor]> + 'static, R: AsMut<[Motor]> + 'static>(left: L, right: R) -> Self {
        Self {
            left:  Rc::new(RefCell::new(left)),
            right: Rc::new(RefCell::new(right)),
            brake: Latest::default(),
        }
    }

    fn brake_side(side: &RefCell<dyn AsMut<[Motor]>>, mode: BrakeMode) -> Result<(), DeviceError> {
        let mode = match mode {
            BrakeMode::Coast => MotorBrake::Coast,
            BrakeMode::Brake => MotorBrake::Brake,
            BrakeMode::Hold => MotorBrake::Hold,
        };
        let mut motors = side.try_borrow_mut().map_err(|_| DeviceError::NotReady)?;
        let mut result = Ok(());
        for motor in motors.as_mut() {
            if motor.brake(mode).is_err() && result.is_ok() {
                result = Err(classify(&*motor));
            }
        }
        result
    }
}

impl Chassis for Differential {
    fn set_efforts(&self, left: f64, right: f64) -> Result<(), DeviceError> {
        let left = set_group_effort(&self.left, left);
        let right = set_group_effort(&self.right, right);
        left.and(right)
    }

    fn set_brake_mode(&self, mode: BrakeMode) -> Result<(), DeviceError> {
        self.brake.set(mode);
        Ok(())
    }

    /// Stops both sides with the selected brake mode.
    fn stop(&self) -> Result<(), DeviceError> {
        let mode = self.brake.get();
        let left = Self::brake_side(&self.left, mode);
        let right = Self::brake_side(&self.right, mode);
        left.and(right)
    }
}

impl Halt for Differential {
    fn name(&self) -> &'static str { "drivetrain" }

    fn halt(&self) -> Result<(), DeviceError> {
        let left = Self::brake_side(&self.left, BrakeMode::Brake);
        let right = Self::brake_side(&self.right, BrakeMode::Brake);
        left.and(right)
    }
}
