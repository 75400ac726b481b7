//! Closed-loop velocity hold for the launcher flywheel.
//!
//! [`VelocityHolder`] owns the target speed. A background loop samples the
//! flywheel every tick and drives it with a feedforward term plus any
//! [`Controller`] variant. The route only ever calls
//! [`set_velocity`](VelocityHolder::set_velocity) and polls
//! [`at_target_velocity`](VelocityHolder::at_target_velocity); neither waits
//! on the loop.
//!
//! ```ignore
//! use talos::motion::{pid::{Controller, PidConstants}, velocity::{VelocityConfig, VelocityHolder}};
//!
//! let flywheel = VelocityHolder::new(VelocityConfig::new(
//!     1.0 / 3600.0,
//!     50.0,
//!     Controller::unbounded(PidConstants::gains(0.001, 0.0, 0.0)),
//! ));
//! flywheel.spawn(motors);
//!
//! flywheel.set_velocity(3212.0);
//! ```

use std::time::Duration;

use log::{info, warn};

use super::pid::Controller;
use crate::{
    error::DeviceError,
    peripherals::{FlywheelMotor, Halt, Launcher},
    supervisor::Heartbeat,
    sync::Latest,
    time::Clock,
};

/// Loop rate for the velocity task in milliseconds.
const LOOPRATE: u64 = 10;

/// Tuning of the velocity loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityConfig {
    /// Feedforward gain: effort per unit of target speed.
    pub kv:         f64,
    /// Band around the target inside which the launcher counts as ready.
    pub tolerance:  f64,
    /// Feedback on top of the feedforward. Its settle logic is not used.
    pub controller: Controller,
}

impl VelocityConfig {
    pub const fn new(kv: f64, tolerance: f64, controller: Controller) -> Self {
        Self {
            kv,
            tolerance,
            controller,
        }
    }
}

/// Loop-private state of the velocity task.
pub struct Hold {
    controller:  Controller,
    last_target: f64,
    stalled:     bool,
}

/// Holds the launcher at a target speed.
///
/// Clones share the target and measurement, so one handle can go to the
/// background loop and another to the shooter.
#[derive(Clone)]
pub struct VelocityHolder {
    config:    VelocityConfig,
    target:    Latest<f64>,
    measured:  Latest<Option<f64>>,
    halted:    Latest<bool>,
    heartbeat: Heartbeat,
}

impl VelocityHolder {
    pub fn new(config: VelocityConfig) -> Self {
        Self {
            config,
            target: Latest::new(0.0),
            measured: Latest::new(None),
            halted: Latest::new(false),
            heartbeat: Heartbeat::default(),
        }
    }

    /// Sets a new target speed. Takes effect on the next tick.
    pub fn set_velocity(&self, target: f64) { self.target.set(target) }

    /// The current target speed.
    pub fn target(&self) -> f64 { self.target.get() }

    /// The last measured speed, if the motor has been read successfully.
    pub fn velocity(&self) -> Option<f64> { self.measured.get() }

    /// Whether the last measured speed is within tolerance of the target.
    pub fn at_target_velocity(&self) -> bool {
        let target = self.target.get();
        self.measured
            .get()
            .is_some_and(|speed| (speed - target).abs() < self.config.tolerance)
    }

    /// The time of the last successful tick, for the supervisor watchdog.
    pub fn heartbeat(&self) -> Heartbeat { self.heartbeat.clone() }

    /// Fresh loop state.
    pub fn hold(&self) -> Hold {
        let mut controller = self.config.controller;
        controller.reset();
        Hold {
            controller,
            last_target: self.target.get(),
            stalled: false,
        }
    }

    /// Runs one tick of the velocity loop.
    ///
    /// A failed speed read skips the tick and leaves the previous effort
    /// applied. After [`Halt::halt`] the loop only ever writes zero effort.
    pub fn tick<M: FlywheelMotor>(&self, motor: &M, hold: &mut Hold, now: Duration) {
        if self.halted.get() {
            write_effort(motor, 0.0);
            return;
        }

        let target = self.target.get();
        if target != hold.last_target {
            hold.controller.reset();
            hold.last_target = target;
        }

        match motor.velocity() {
            Ok(speed) => {
                self.measured.set(Some(speed));
                let dt = LOOPRATE as f64 / 1000.0;
                let feedback = hold.controller.step(speed, target, dt).output;
                write_effort(motor, (self.config.kv * target + feedback).clamp(-1.0, 1.0));
                self.heartbeat.beat(now);
                if hold.stalled {
                    info!("Flywheel readings recovered at {:.0}", speed);
                    hold.stalled = false;
                }
            }
            Err(e) => {
                if !hold.stalled {
                    warn!("Flywheel velocity read failed: {}", e);
                    hold.stalled = true;
                }
            }
        }
    }

    /// Runs the velocity loop forever.
    pub async fn run<M: FlywheelMotor, C: Clock>(self, motor: M, clock: C) {
        info!("Velocity Control Loop Started");
        let mut hold = self.hold();
        loop {
            self.tick(&motor, &mut hold, clock.now());
            clock.sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }
}

fn write_effort<M: FlywheelMotor>(motor: &M, effort: f64) {
    if let Err(e) = motor.set_effort(effort) {
        warn!("Flywheel write failed: {}", e);
    }
}

#[cfg(target_os = "vexos")]
impl VelocityHolder {
    /// Spawns the velocity loop as a detached task on the vexide executor.
    pub fn spawn(&self, motors: crate::peripherals::vex::Flywheel) {
        let holder = self.clone();
        vexide::task::spawn(holder.run(motors, crate::time::VexClock)).detach();
    }
}

impl Launcher for VelocityHolder {
    fn set_velocity(&self, target: f64) { VelocityHolder::set_velocity(self, target) }

    fn at_target_velocity(&self) -> bool { VelocityHolder::at_target_velocity(self) }
}

impl Halt for VelocityHolder {
    fn name(&self) -> &'static str { "flywheel loop" }

    fn halt(&self) -> Result<(), DeviceError> {
        self.halted.set(true);
        self.target.set(0.0);
        Ok(())
    }
}
