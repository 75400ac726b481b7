//! Odometry tracking for robot position estimation.
//!
//! # Module Structure
//!
//! - **[`pose`]**: The pose type shared with the rest of the crate.
//! - **[`sensors`]**: The raw readings and the [`OdomSensors`] capability.
//! - **[`tracker`]**: The background estimator and its pose handle.
//! - **`devices`**: V5 tracking wheels and IMU (VEXos builds only).
//!
//! # How It Works
//!
//! A vertical tracking wheel measures forward travel, a horizontal one
//! measures sideways travel and an IMU measures rotation. Each tick the
//! estimator turns the change in those readings into a displacement along
//! an arc and adds it, rotated into the field frame, to the global pose.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::odom::{OdomTracker, Pose};
//!
//! let odom = OdomTracker::from_pose(Pose::new(18.5, 91.2, 0.0), faults.clone());
//! odom.spawn(mechanism);
//! ```

mod algorithm;

/// V5 tracking devices.
#[cfg(target_os = "vexos")]
pub mod devices;

pub mod pose;

pub mod sensors;

/// Background pose estimator.
pub mod tracker;

pub use pose::Pose;
pub use sensors::{OdomReading, OdomSensors, SensorFailure, TrackerOffsets};
pub use tracker::{OdomTracker, TrackerStatus};
