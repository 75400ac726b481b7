//! Motion primitives for a differential chassis.
//!
//! Each primitive runs its own control loop in the calling task: every tick
//! it reads the live pose from the [`OdomTracker`], steps its controllers and
//! writes efforts to the chassis. The call returns once the terminating
//! controller settles, with the chassis stopped.
//!
//! A distance controller that can never settle (e.g. [`Controller::Open`])
//! drives *through* the target instead: the move returns as soon as the
//! travelled distance reaches the target, and the chassis is left running
//! so the next move starts at speed.
//!
//! # Usage
//!
//! ```ignore
//! use talos::motion::{movement::{DrivetrainConfig, Movement}, pid::presets};
//!
//! let movement = Movement::new(drivetrain, DrivetrainConfig::new(12.5), odom.clone(), VexClock);
//!
//! movement
//!     .forward(presets::drive(0.6), presets::heading_correction(), 34.2, 0.0)
//!     .await;
//! movement.turn(presets::turn(), 44.88_f64.to_radians()).await;
//! movement
//!     .curve(presets::drive(1.0), presets::curve(), 0.0, 90_f64.to_radians(), 24.0)
//!     .await;
//! ```
//!
//! There is no timeout. A bounded move that never settles runs until the
//! surrounding route is cancelled.

use std::time::Duration;

use log::{debug, info, warn};

use super::{odom::OdomTracker, pid::Controller};
use crate::{
    peripherals::{BrakeMode, Chassis},
    time::Clock,
};

/// Loop rate for motion primitives in milliseconds.
const LOOPRATE: u64 = 10;

/// Physical configuration of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivetrainConfig {
    /// Distance between the left and right wheel contact patches, in inches.
    pub track_width: f64,
}

impl DrivetrainConfig {
    pub const fn new(track_width: f64) -> Self { Self { track_width } }
}

/// How a primitive ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Number of control ticks run, including the final one.
    pub ticks: u32,
    /// Remaining distance or heading error on the final tick.
    pub error: f64,
}

/// Executes motion primitives against a chassis and a pose estimate.
pub struct Movement<D: Chassis, C: Clock> {
    /// The differential drivetrain to control.
    pub drivetrain:        D,
    /// Physical configuration of the drivetrain.
    pub drivetrain_config: DrivetrainConfig,
    /// Source of the live pose.
    pub odom:              OdomTracker,
    pub clock:             C,
}

impl<D: Chassis, C: Clock> Movement<D, C> {
    pub fn new(drivetrain: D, drivetrain_config: DrivetrainConfig, odom: OdomTracker, clock: C) -> Self {
        Self {
            drivetrain,
            drivetrain_config,
            odom,
            clock,
        }
    }

    /// Sets the chassis brake mode used whenever a primitive stops.
    pub fn set_brake_mode(&self, mode: BrakeMode) {
        if let Err(e) = self.drivetrain.set_brake_mode(mode) {
            warn!("Failed to set brake mode: {}", e);
        }
    }

    /// Drives `distance` inches along `heading` (radians), measured from the
    /// pose at the start of the call. A negative distance drives backward.
    ///
    /// `heading_ctrl` only corrects the heading; the move ends when
    /// `distance_ctrl` settles, or once `distance` is reached if it cannot.
    /// An open-loop distance controller only sets the speed: the direction
    /// follows the sign of `distance`.
    pub async fn forward(
        &self,
        mut distance_ctrl: Controller,
        mut heading_ctrl: Controller,
        distance: f64,
        heading: f64,
    ) -> MoveOutcome {
        distance_ctrl.reset();
        heading_ctrl.reset();
        let dt = LOOPRATE as f64 / 1000.0;
        let start = self.odom.pose();
        debug!("Forward {:.2}\" at {:.2}° from {}", distance, heading.to_degrees(), start);

        let passes_through = !distance_ctrl.can_settle();
        let mut ticks = 0;
        loop {
            let pose = self.odom.pose();
            let travelled = pose.projected_from(&start, heading);
            ticks += 1;
            if passes_through && reached(travelled, distance) {
                return self.pass("Forward", ticks, distance - travelled);
            }

            let drive = distance_ctrl.step(travelled, distance, dt);
            let correction = heading_ctrl.step(pose.heading, heading, dt);
            if drive.settled {
                return self.finish("Forward", ticks, distance - travelled);
            }
            let speed = if passes_through {
                drive.output.abs().copysign(distance - travelled)
            } else {
                drive.output
            };
            self.apply(speed - correction.output, speed + correction.output);
            self.clock.sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }

    /// Turns in place to the absolute `heading` (radians).
    ///
    /// Headings are not wrapped, so the target also selects the direction
    /// and number of revolutions.
    pub async fn turn(&self, mut heading_ctrl: Controller, heading: f64) -> MoveOutcome {
        heading_ctrl.reset();
        let dt = LOOPRATE as f64 / 1000.0;
        debug!("Turn to {:.2}° from {}", heading.to_degrees(), self.odom.pose());

        let mut ticks = 0;
        loop {
            let current = self.odom.get_heading();
            let step = heading_ctrl.step(current, heading, dt);
            ticks += 1;

            if step.settled {
                return self.finish("Turn", ticks, heading - current);
            }
            self.apply(-step.output, step.output);
            self.clock.sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }

    /// Follows a circular arc of `radius` inches, sweeping the heading from
    /// `start_heading` to `end_heading` (radians).
    ///
    /// A negative radius drives the arc in reverse. The heading target moves
    /// along the arc in proportion to the distance covered, and the side
    /// efforts carry a curvature feedforward so the curve controller only has
    /// to correct drift.
    pub async fn curve(
        &self,
        mut distance_ctrl: Controller,
        mut curve_ctrl: Controller,
        start_heading: f64,
        end_heading: f64,
        radius: f64,
    ) -> MoveOutcome {
        distance_ctrl.reset();
        curve_ctrl.reset();
        let dt = LOOPRATE as f64 / 1000.0;
        let sweep = end_heading - start_heading;
        let arc = radius * sweep.abs();
        let curvature = if arc == 0.0 { 0.0 } else { sweep / arc };
        let half_track = self.drivetrain_config.track_width / 2.0;
        debug!(
            "Curve {:.2}° -> {:.2}° over {:.2}\"",
            start_heading.to_degrees(),
            end_heading.to_degrees(),
            arc
        );

        let passes_through = !distance_ctrl.can_settle();
        let mut prev = self.odom.pose();
        let mut travelled = 0.0;
        let mut ticks = 0;
        loop {
            let pose = self.odom.pose();
            travelled += pose.projected_from(&prev, (prev.heading + pose.heading) / 2.0);
            prev = pose;
            ticks += 1;
            if passes_through && reached(travelled, arc) {
                return self.pass("Curve", ticks, arc - travelled);
            }

            let progress = if arc == 0.0 {
                1.0
            } else {
                (travelled / arc).clamp(0.0, 1.0)
            };
            let target_heading = start_heading + sweep * progress;

            let drive = distance_ctrl.step(travelled, arc, dt);
            let correction = curve_ctrl.step(pose.heading, target_heading, dt);
            if drive.settled {
                return self.finish("Curve", ticks, arc - travelled);
            }
            let speed = if passes_through {
                drive.output.abs().copysign(arc - travelled)
            } else {
                drive.output
            };
            let differential = speed * curvature * half_track + correction.output;
            self.apply(speed - differential, speed + differential);
            self.clock.sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }

    fn apply(&self, left: f64, right: f64) {
        if let Err(e) = self.drivetrain.set_efforts(left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0)) {
            warn!("Drivetrain write failed: {}", e);
        }
    }

    fn finish(&self, primitive: &str, ticks: u32, error: f64) -> MoveOutcome {
        if let Err(e) = self.drivetrain.stop() {
            warn!("Failed to stop drivetrain: {}", e);
        }
        info!("{} settled after {} ticks at {}", primitive, ticks, self.odom.pose());
        MoveOutcome { ticks, error }
    }

    fn pass(&self, primitive: &str, ticks: u32, error: f64) -> MoveOutcome {
        info!("{} passed through after {} ticks at {}", primitive, ticks, self.odom.pose());
        MoveOutcome { ticks, error }
    }
}

/// Whether `travelled` has reached `target` in the target's direction.
fn reached(travelled: f64, target: f64) -> bool {
    if target >= 0.0 {
        travelled >= target
    } else {
        travelled <= target
    }
}
