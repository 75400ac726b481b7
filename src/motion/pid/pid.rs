//! The PID term shared by every closed-loop controller variant.
//!
//! ```ignore
//! use talos::motion::pid::pid::{Pid, PidConstants};
//!
//! let mut pid = Pid::new(PidConstants::new(0.1, 0.0, 0.0, 0.12, 0.6));
//! let effort = pid.update(24.0, 0.01);
//! ```

/// Gains and output limits of a PID controller.
///
/// The floor and ceiling bound the output *magnitude*. A floor keeps the
/// output large enough to overcome static friction near the target; the
/// ceiling is the maximum speed of the move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidConstants {
    /// Proportional gain.
    pub kp:      f64,
    /// Integral gain.
    ///
    /// The accumulated error is not clamped. Keep this at zero unless a move
    /// consistently stops short, and keep moves short when it is not.
    pub ki:      f64,
    /// Derivative gain.
    pub kd:      f64,
    /// Minimum output magnitude for any non-zero output.
    pub floor:   f64,
    /// Maximum output magnitude.
    pub ceiling: f64,
}

impl PidConstants {
    pub const fn new(kp: f64, ki: f64, kd: f64, floor: f64, ceiling: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            floor,
            ceiling,
        }
    }

    /// Gains with no floor and a full-scale ceiling.
    pub const fn gains(kp: f64, ki: f64, kd: f64) -> Self { Self::new(kp, ki, kd, 0.0, 1.0) }

    /// Clamps `raw` into the configured magnitude band, preserving its sign.
    ///
    /// A raw output of exactly zero stays zero: there is no direction in which
    /// to apply the floor.
    pub fn clamp(&self, raw: f64) -> f64 {
        if raw == 0.0 || raw.is_nan() {
            return 0.0;
        }
        let ceiling = self.ceiling.abs();
        let floor = self.floor.abs().min(ceiling);
        raw.signum() * raw.abs().max(floor).min(ceiling)
    }
}

impl Default for PidConstants {
    fn default() -> Self { Self::gains(1.0, 0.0, 0.0) }
}

/// A PID controller and its per-move state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pid {
    pub constants: PidConstants,
    integral:      f64,
    prev_error:    Option<f64>,
}

impl Pid {
    pub const fn new(constants: PidConstants) -> Self {
        Self {
            constants,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// Feeds one error sample taken `dt` seconds after the previous one and
    /// returns the clamped output.
    ///
    /// The derivative term is zero on the first sample after a reset so a
    /// large initial error does not kick the output.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        self.integral += error * dt;
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        let raw = self.constants.kp * error +
            self.constants.ki * self.integral +
            self.constants.kd * derivative;
        self.constants.clamp(raw)
    }

    /// Clears the accumulated and previous error.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    /// The accumulated error since the last reset.
    pub fn integral(&self) -> f64 { self.integral }
}
