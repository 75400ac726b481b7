//! The raw measurements consumed by the pose estimator.

use crate::error::DeviceError;

/// Cumulative readings from the tracking sensors at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OdomReading {
    /// Forward travel of the vertical tracking wheel, in inches.
    pub vertical:   f64,
    /// Sideways travel of the horizontal tracking wheel, in inches, positive
    /// toward the robot's left.
    pub horizontal: f64,
    /// Total rotation in radians, counter-clockwise positive.
    pub rotation:   f64,
}

/// Where the tracking wheels sit relative to the tracking center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackerOffsets {
    /// Distance of the vertical wheel to the left of center, in inches.
    pub vertical:   f64,
    /// Distance of the horizontal wheel behind center, in inches.
    pub horizontal: f64,
}

/// A source of odometry readings.
///
/// Each accessor is independent so the estimator can tell a lost heading
/// sensor (fatal) apart from a tracking wheel hiccup (skip the tick).
pub trait OdomSensors {
    /// Zeroes every sensor.
    fn reset(&self) -> Result<(), DeviceError>;

    /// Total rotation in radians, counter-clockwise positive.
    fn rotation(&self) -> Result<f64, DeviceError>;

    /// Forward wheel travel in inches.
    fn vertical(&self) -> Result<f64, DeviceError>;

    /// Sideways wheel travel in inches, positive to the left.
    fn horizontal(&self) -> Result<f64, DeviceError>;

    /// Mounting geometry of the tracking wheels.
    fn offsets(&self) -> TrackerOffsets;

    /// Reads all three sensors, failing on the first error.
    fn read(&self) -> Result<OdomReading, SensorFailure> {
        let rotation = self.rotation().map_err(SensorFailure::Heading)?;
        let vertical = self.vertical().map_err(SensorFailure::Tracking)?;
        let horizontal = self.horizontal().map_err(SensorFailure::Tracking)?;
        Ok(OdomReading {
            vertical,
            horizontal,
            rotation,
        })
    }
}

/// Which part of the tracking hardware failed during a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorFailure {
    #[error("heading sensor: {0}")]
    Heading(DeviceError),
    #[error("tracking wheel: {0}")]
    Tracking(DeviceError),
}
