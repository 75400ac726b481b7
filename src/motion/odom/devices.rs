//! V5 tracking hardware.
//!
//! - **TrackingSensor**: An abstraction over the encoder types a tracking
//!   wheel can use.
//! - **Tracker**: A tracking wheel with its gearing and mounting offset.
//! - **TrackerMech**: The vertical and horizontal trackers plus the IMU,
//!   implementing [`OdomSensors`].
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::odom::devices::{Tracker, TrackerMech, TrackingSensor};
//! use vexide::prelude::*;
//!
//! // 2.75" wheels; the vertical wheel sits 1.5" left of center and the
//! // horizontal wheel 3.5" behind it.
//! let vertical = Tracker::new(
//!     TrackingSensor::new_rotation_sensor(RotationSensor::new(peripherals.port_5, Direction::Forward)),
//!     2.75, 1.0, 1.0, 1.5,
//! );
//! let horizontal = Tracker::new(
//!     TrackingSensor::new_rotation_sensor(RotationSensor::new(peripherals.port_6, Direction::Reverse)),
//!     2.75, 1.0, 1.0, 3.5,
//! );
//! let mechanism = TrackerMech::new(vertical, horizontal, InertialSensor::new(peripherals.port_10));
//! ```

use std::{cell::RefCell, rc::Rc};

use log::warn;
use vexide::{
    adi::encoder::AdiOpticalEncoder,
    math::Angle,
    smart::{SmartDevice, imu::InertialSensor, rotation::RotationSensor},
};

use super::sensors::{OdomSensors, TrackerOffsets};
use crate::{error::DeviceError, peripherals::vex::classify};

/// An abstraction over different encoder types used for tracking.
#[derive(Clone)]
pub enum TrackingSensor {
    /// An ADI (3-wire) optical shaft encoder.
    AdiOpticalEncoder(Rc<RefCell<AdiOpticalEncoder>>),
    /// A V5 rotation sensor.
    RotationSensor(Rc<RefCell<RotationSensor>>),
    /// No tracking sensor; always reads zero.
    None,
}

impl TrackingSensor {
    pub fn new_adi_optical_encoder(encoder: AdiOpticalEncoder) -> Self {
        Self::AdiOpticalEncoder(Rc::new(RefCell::new(encoder)))
    }

    pub fn new_rotation_sensor(sensor: RotationSensor) -> Self {
        Self::RotationSensor(Rc::new(RefCell::new(sensor)))
    }

    pub fn new_none() -> Self { Self::None }

    /// Current angular position of the sensor.
    pub fn position(&self) -> Result<Angle, DeviceError> {
        match self {
            TrackingSensor::AdiOpticalEncoder(encoder) => {
                encoder.borrow().position().map_err(|e| {
                    warn!("ADI Optical Encoder Position Error: {}", e);
                    DeviceError::Io
                })
            }
            TrackingSensor::RotationSensor(sensor) => {
                let sensor = sensor.borrow();
                sensor.position().map_err(|e| {
                    warn!("Rotation Sensor Position Error: {}", e);
                    classify(&*sensor)
                })
            }
            TrackingSensor::None => Ok(Angle::from_radians(0.0)),
        }
    }

    /// Resets the sensor position to zero.
    pub fn reset_position(&self) -> Result<(), DeviceError> {
        match self {
            TrackingSensor::AdiOpticalEncoder(encoder) => {
                encoder.borrow_mut().reset_position().map_err(|_| DeviceError::Io)
            }
            TrackingSensor::RotationSensor(sensor) => {
                let mut sensor = sensor.borrow_mut();
                sensor.reset_position().map_err(|_| classify(&*sensor))
            }
            TrackingSensor::None => Ok(()),
        }
    }
}

/// A tracking wheel: an unpowered wheel with an encoder.
#[derive(Clone)]
pub struct Tracker {
    /// The sensor measuring wheel rotation.
    pub sensor:         TrackingSensor,
    /// The diameter of the tracking wheel in inches.
    pub wheel_diameter: f64,
    /// The number of teeth on the driven (wheel-side) gear.
    pub driven_gear:    f64,
    /// The number of teeth on the driving (encoder-side) gear.
    pub driving_gear:   f64,
    /// Mounting offset from the tracking center in inches. For the vertical
    /// wheel this is the distance to the left; for the horizontal wheel, the
    /// distance behind.
    pub offset:         f64,
}

impl Tracker {
    pub fn new(
        sensor: TrackingSensor,
        wheel_diameter: f64,
        driven_gear: f64,
        driving_gear: f64,
        offset: f64,
    ) -> Self {
        Self {
            sensor,
            wheel_diameter,
            driven_gear,
            driving_gear,
            offset,
        }
    }

    /// Distance travelled by the wheel in inches.
    pub fn dist(&self) -> Result<f64, DeviceError> {
        let angle = self.sensor.position()?;
        let gear_ratio = self.driving_gear / self.driven_gear;
        Ok(angle.as_radians() * gear_ratio * (self.wheel_diameter / 2.0))
    }
}

/// The complete tracking mechanism.
///
/// The horizontal tracker must be wired so that it reads positive when the
/// robot moves to its left.
#[derive(Clone)]
pub struct TrackerMech {
    /// The vertical (forward/backward) tracking wheel.
    pub vertical_tracker:   Tracker,
    /// The horizontal (left/right) tracking wheel.
    pub horizontal_tracker: Tracker,
    /// The inertial sensor for heading measurement.
    pub imu:                Rc<RefCell<InertialSensor>>,
}

impl TrackerMech {
    pub fn new(vertical_tracker: Tracker, horizontal_tracker: Tracker, imu: InertialSensor) -> Self {
        Self {
            vertical_tracker,
            horizontal_tracker,
            imu: Rc::new(RefCell::new(imu)),
        }
    }
}

impl OdomSensors for TrackerMech {
    /// Zeroes the tracking wheels. The IMU keeps its rotation; the estimator
    /// only uses its change from the baseline reading.
    fn reset(&self) -> Result<(), DeviceError> {
        self.vertical_tracker.sensor.reset_position()?;
        self.horizontal_tracker.sensor.reset_position()
    }

    /// The IMU reports clockwise rotation; it is negated here.
    fn rotation(&self) -> Result<f64, DeviceError> {
        let imu = self.imu.borrow();
        match imu.rotation() {
            Ok(angle) => Ok(-angle.as_radians()),
            Err(_) if !imu.is_connected() => Err(DeviceError::Disconnected),
            Err(_) => Err(DeviceError::NotReady),
        }
    }

    fn vertical(&self) -> Result<f64, DeviceError> { self.vertical_tracker.dist() }

    fn horizontal(&self) -> Result<f64, DeviceError> { self.horizontal_tracker.dist() }

    fn offsets(&self) -> TrackerOffsets {
        TrackerOffsets {
            vertical:   self.vertical_tracker.offset,
            horizontal: self.horizontal_tracker.offset,
        }
    }
}
