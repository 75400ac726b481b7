//! Controller configurations tuned on the competition robot.
//!
//! Distances are in inches, headings in radians and outputs in normalized
//! effort. Drive presets take the move's maximum speed so a route can slow
//! down for precise pickups without retuning the gains.
//!
//! ```ignore
//! use talos::motion::pid::presets;
//!
//! movement
//!     .forward(presets::drive_precise(0.6), presets::heading_correction(), 17.46, 44.88_f64.to_radians())
//!     .await;
//! movement.turn(presets::turn_precise(), 315.27_f64.to_radians()).await;
//! ```

use super::{Controller, DEFAULT_SETTLE_TICKS, PidConstants};

/// Minimum drive effort; below this the chassis stalls on foam tiles.
const DRIVE_FLOOR: f64 = 0.12;
const DRIVE_KP: f64 = 0.1;

/// Distance controller that stops on the first pass within half an inch.
pub fn drive(max_speed: f64) -> Controller {
    Controller::single_bounded(PidConstants::new(DRIVE_KP, 0.0, 0.0, DRIVE_FLOOR, max_speed), 0.5)
}

/// Distance controller that must hold within a tenth of an inch for three
/// ticks.
pub fn drive_precise(max_speed: f64) -> Controller {
    Controller::double_bounded(
        PidConstants::new(DRIVE_KP, 0.0, 0.0, DRIVE_FLOOR, max_speed),
        0.1,
        DEFAULT_SETTLE_TICKS,
    )
}

/// Heading correction applied while driving straight.
pub fn heading_correction() -> Controller {
    Controller::unbounded(PidConstants::new(1.0, 0.0, 0.1, 0.0, 1.0))
}

/// Turn-in-place controller settling within 1.5 degrees.
pub fn turn() -> Controller {
    Controller::double_bounded(
        PidConstants::new(1.25, 0.0, 0.095, 0.15, 1.0),
        1.5_f64.to_radians(),
        DEFAULT_SETTLE_TICKS,
    )
}

/// Turn-in-place controller settling within 0.75 degrees.
pub fn turn_precise() -> Controller {
    Controller::double_bounded(
        PidConstants::new(1.25, 0.0, 0.095, 0.15, 1.0),
        0.75_f64.to_radians(),
        DEFAULT_SETTLE_TICKS,
    )
}

/// Heading controller used to hold the interpolated heading along an arc.
pub fn curve() -> Controller { Controller::unbounded(PidConstants::gains(2.5, 0.0, 0.0)) }

/// Drives at a constant speed without slowing near the target.
pub fn no_slowdown(max_speed: f64) -> Controller { Controller::open(max_speed) }
