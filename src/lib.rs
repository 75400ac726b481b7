//! # Talos
//!
//! Talos is the autonomous control core of a differential-drive disc launcher
//! robot, built on top of [Vexide](https://vexide.dev). It provides:
//!
//! - **Motion Control**: Bounded and unbounded PID controller variants, and
//!   forward, turn and curve primitives driven by live odometry.
//! - **Odometry**: A background pose estimator using tracking wheels and an
//!   inertial sensor.
//! - **Launcher Control**: A background velocity hold for the flywheel and a
//!   timed multi-disc firing sequence.
//! - **Supervision**: A watchdog that halts every actuator on a fatal fault.
//! - **Logging**: A console and SD card logger.
//!
//! ## Quick Start
//!
//! ```ignore
//! use talos::{
//!     error::FaultSlot,
//!     motion::{movement::{DrivetrainConfig, Movement}, odom::{OdomTracker, Pose}, pid::presets},
//!     supervisor::Supervisor,
//!     time::VexClock,
//! };
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     let faults = FaultSlot::new();
//!     let odom = OdomTracker::from_pose(Pose::new(18.5, 91.2, 0.0), faults.clone());
//!     odom.spawn(mechanism);
//!
//!     let movement = Movement::new(drivetrain.clone(), DrivetrainConfig::new(12.5), odom.clone(), VexClock);
//!     let supervisor = Supervisor::new(VexClock, faults)
//!         .watch("odometry", odom.heartbeat())
//!         .halt_on_fault(drivetrain);
//!
//!     let _ = supervisor
//!         .run(async {
//!             movement.turn(presets::turn_precise(), 44.88_f64.to_radians()).await;
//!         })
//!         .await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`motion`]: Controllers, odometry, motion primitives and velocity hold.
//! - [`shooter`]: The firing sequence.
//! - [`supervisor`]: Fault watchdog around the route.
//! - [`peripherals`]: The device capabilities the core is written against.
//! - [`fs`]: Filesystem utilities including logging.

/// Device and fault error types.
pub mod error;

/// Filesystem utilities module.
///
/// Contains logging functionality for recording robot telemetry and debug
/// information to files on the V5 Brain's SD card.
pub mod fs;

/// Autonomous motion control module.
pub mod motion;

/// Device capabilities and their V5 implementations.
pub mod peripherals;

/// Timed multi-disc firing sequence.
pub mod shooter;

/// Fault watchdog and actuator halting.
pub mod supervisor;

/// Single-writer cells shared between tasks.
pub mod sync;

/// The clock abstraction used by every loop.
pub mod time;

#[cfg(test)]
mod sim;
