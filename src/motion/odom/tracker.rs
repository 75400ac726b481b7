//! Odometry tracking controller.
//!
//! [`OdomTracker`] owns the robot's global [`Pose`]. A background loop reads
//! the tracking sensors every tick and accumulates the measured displacement
//! into it; everything else only reads the pose, except for explicit resets
//! when a route seeds its starting position.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::odom::{OdomTracker, devices::TrackerMech};
//!
//! let odom = OdomTracker::new(faults.clone());
//! odom.set_position(18.5, 91.2);
//! odom.set_heading(0.0);
//! odom.spawn(mechanism);
//!
//! let pose = odom.pose();
//! ```

use std::time::Duration;

use log::{info, warn};

use super::{
    Pose,
    algorithm::Integrator,
    sensors::{OdomSensors, SensorFailure},
};
use crate::{
    error::{DeviceError, Fault, FaultSlot},
    supervisor::Heartbeat,
    sync::Latest,
    time::Clock,
};

/// Loop rate for the odometry task in milliseconds.
const LOOPRATE: u64 = 10;

/// Lifecycle of the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerStatus {
    /// Sensors have not been zeroed yet; the pose is only what was seeded.
    #[default]
    Uninitialized,
    /// The loop is integrating sensor readings.
    Running,
}

/// Odometry position tracker.
///
/// Cloning yields another handle to the same pose, which is how the motion
/// executor and the route read the estimate written by the background loop.
#[derive(Clone)]
pub struct OdomTracker {
    global_pose: Latest<Pose>,
    status:      Latest<TrackerStatus>,
    heartbeat:   Heartbeat,
    faults:      FaultSlot,
}

/// Loop-private integration state created by [`OdomTracker::init`].
pub struct Estimation {
    integrator: Integrator,
    stalled:    bool,
}

impl OdomTracker {
    /// Creates a tracker starting at the origin. Faults are raised into
    /// `faults`.
    pub fn new(faults: FaultSlot) -> Self { Self::from_pose(Pose::origin(), faults) }

    /// Creates a tracker starting at `pose`.
    pub fn from_pose(pose: Pose, faults: FaultSlot) -> Self {
        Self {
            global_pose: Latest::new(pose),
            status: Latest::default(),
            heartbeat: Heartbeat::default(),
            faults,
        }
    }

    /// The latest pose estimate.
    pub fn pose(&self) -> Pose { self.global_pose.get() }

    /// The accumulated heading in radians.
    pub fn get_heading(&self) -> f64 { self.global_pose.get().heading }

    /// Overwrites the heading. Later ticks accumulate on top of it.
    pub fn set_heading(&self, heading: f64) {
        self.global_pose.update(|pose| Pose { heading, ..pose });
    }

    /// Overwrites the position, keeping the heading.
    pub fn set_position(&self, x: f64, y: f64) {
        self.global_pose.update(|pose| Pose { x, y, ..pose });
    }

    /// Overwrites the whole pose.
    pub fn reset_from_pose(&self, pose: Pose) { self.global_pose.set(pose); }

    pub fn status(&self) -> TrackerStatus { self.status.get() }

    /// The time of the last successful tick, for the supervisor watchdog.
    pub fn heartbeat(&self) -> Heartbeat { self.heartbeat.clone() }

    /// Zeroes the sensors, captures the baseline reading and moves the
    /// tracker to [`TrackerStatus::Running`].
    pub fn init<S: OdomSensors>(&self, sensors: &S) -> Result<Estimation, SensorFailure> {
        sensors.reset().map_err(SensorFailure::Tracking)?;
        let baseline = sensors.read()?;
        self.status.set(TrackerStatus::Running);
        info!("Odometry initialized at {}", self.pose());
        Ok(Estimation {
            integrator: Integrator::new(baseline, sensors.offsets()),
            stalled:    false,
        })
    }

    /// Integrates one reading into the pose.
    ///
    /// A failed read leaves the pose untouched and skips the tick. A
    /// disconnected heading sensor is additionally raised as a fault.
    pub fn tick<S: OdomSensors>(&self, sensors: &S, estimation: &mut Estimation, now: Duration) {
        match sensors.read() {
            Ok(reading) => {
                let pose = self.global_pose.get();
                let delta = estimation.integrator.advance(reading, pose.heading);
                self.global_pose.set(Pose::new(
                    pose.x + delta.x,
                    pose.y + delta.y,
                    pose.heading + delta.heading,
                ));
                self.heartbeat.beat(now);
                if estimation.stalled {
                    info!("Odometry recovered at {}", self.pose());
                    estimation.stalled = false;
                }
            }
            Err(failure) => {
                self.report(failure);
                if !estimation.stalled {
                    warn!("Odometry stalled: {}", failure);
                    estimation.stalled = true;
                }
            }
        }
    }

    /// Runs the tracking loop forever.
    ///
    /// Initialization is retried every tick until the sensors respond.
    pub async fn run<S: OdomSensors, C: Clock>(self, sensors: S, clock: C) {
        info!("Odometry Tracking Started");
        let mut warned = false;
        let mut estimation = loop {
            match self.init(&sensors) {
                Ok(estimation) => break estimation,
                Err(failure) => {
                    self.report(failure);
                    if !warned {
                        warn!("Odometry init failed: {}", failure);
                        warned = true;
                    }
                }
            }
            clock.sleep(Duration::from_millis(LOOPRATE)).await;
        };

        loop {
            clock.sleep(Duration::from_millis(LOOPRATE)).await;
            self.tick(&sensors, &mut estimation, clock.now());
        }
    }

    fn report(&self, failure: SensorFailure) {
        if failure == SensorFailure::Heading(DeviceError::Disconnected) {
            self.faults.raise(Fault::HeadingSensorLost);
        }
    }
}

#[cfg(target_os = "vexos")]
impl OdomTracker {
    /// Spawns the tracking loop as a detached task on the vexide executor.
    pub fn spawn(&self, sensors: super::devices::TrackerMech) {
        let tracker = self.clone();
        vexide::task::spawn(tracker.run(sensors, crate::time::VexClock)).detach();
    }
}
