//! Autonomous motion control.
//!
//! - **Odometry**: Position tracking using tracking wheels and an inertial
//!   sensor.
//! - **PID Control**: The controller variants that decide how hard to push and
//!   when a move is done.
//! - **Movement**: Forward, turn and curve primitives built on the two above.
//! - **Velocity**: The launcher flywheel's velocity hold.
//!
//! # Architecture
//!
//! Odometry and the velocity hold run as background tasks for the whole
//! routine. Motion primitives run in the route's own task: each call drives
//! the chassis until its terminating controller settles, then returns.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::{movement::Movement, pid::presets};
//!
//! movement.turn(presets::turn_precise(), 44.88_f64.to_radians()).await;
//! movement
//!     .forward(presets::drive_precise(0.6), presets::heading_correction(), 17.46, 44.88_f64.to_radians())
//!     .await;
//! ```

/// Motion primitives for a differential chassis.
pub mod movement;

/// Odometry tracking for position estimation.
pub mod odom;

/// Controller variants and tuned presets.
pub mod pid;

/// Velocity hold for the launcher flywheel.
pub mod velocity;
