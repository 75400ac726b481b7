//! Feedback controllers that decide how hard to push and when a move is done.
//!
//! Every controller implements the same step contract:
//!
//! ```text
//! step(current, target, dt) -> Step { output, settled }
//! ```
//!
//! where the error is `target - current`. The variants differ only in how
//! they compute `output` and when they declare themselves settled:
//!
//! | Variant          | Output                  | Settles when                           |
//! |------------------|-------------------------|----------------------------------------|
//! | `Unbounded`      | clamped PID             | never                                  |
//! | `SingleBounded`  | clamped PID             | first tick with `|e| < tolerance`      |
//! | `DoubleBounded`  | clamped PID             | `N` consecutive ticks in tolerance     |
//! | `Open`           | fixed speed             | never                                  |
//!
//! An unbounded controller is the heading correction inside a forward move:
//! it runs every tick but the distance controller decides when to stop. The
//! open-loop variant is for driving *through* a point without slowing down,
//! or with a speed of zero to disable a correction term entirely.
//!
//! # Tuning
//!
//! Start with Kp and increase until the robot reaches the target. Add Kd to
//! reduce overshoot. Only add Ki if the robot consistently undershoots: the
//! integral is not clamped, so a long stalled move will wind it up.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::pid::{Controller, PidConstants};
//!
//! let mut ctrl = Controller::double_bounded(PidConstants::new(0.1, 0.0, 0.0, 0.12, 0.6), 0.1, 3);
//! let step = ctrl.step(0.0, 24.0, 0.01);
//! assert!(!step.settled);
//! ```

/// The PID term and its gains.
pub mod pid;

/// Tuned controller configurations used by competition routes.
pub mod presets;

pub use pid::{Pid, PidConstants};

/// Settle count used when none is given.
pub const DEFAULT_SETTLE_TICKS: u32 = 3;

/// The result of one controller tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Clamped control output.
    pub output:  f64,
    /// Whether the controller considers its move complete.
    pub settled: bool,
}

/// A feedback controller variant together with its per-move state.
///
/// Controllers are built from route data and consumed by a single motion
/// primitive, which resets them before the first tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Controller {
    /// PID output that never settles.
    Unbounded(Pid),
    /// PID output that settles on the first tick inside the tolerance band.
    SingleBounded {
        pid:       Pid,
        tolerance: f64,
    },
    /// PID output that settles after `settle_ticks` consecutive ticks inside
    /// the tolerance band.
    DoubleBounded {
        pid:          Pid,
        tolerance:    f64,
        settle_ticks: u32,
        in_band:      u32,
    },
    /// A fixed output that ignores the error and never settles.
    Open {
        speed:     f64,
        max_speed: f64,
    },
}

impl Controller {
    pub const fn unbounded(constants: PidConstants) -> Self { Self::Unbounded(Pid::new(constants)) }

    pub const fn single_bounded(constants: PidConstants, tolerance: f64) -> Self {
        Self::SingleBounded {
            pid: Pid::new(constants),
            tolerance,
        }
    }

    pub const fn double_bounded(constants: PidConstants, tolerance: f64, settle_ticks: u32) -> Self {
        Self::DoubleBounded {
            pid: Pid::new(constants),
            tolerance,
            settle_ticks,
            in_band: 0,
        }
    }

    /// An open-loop controller that always outputs `max_speed`.
    pub const fn open(max_speed: f64) -> Self {
        Self::Open {
            speed: max_speed,
            max_speed,
        }
    }

    /// An open-loop controller outputting `speed`, capped at `max_speed`.
    pub const fn open_capped(speed: f64, max_speed: f64) -> Self { Self::Open { speed, max_speed } }

    /// Runs one tick of the controller.
    pub fn step(&mut self, current: f64, target: f64, dt: f64) -> Step {
        let error = target - current;
        match self {
            Self::Unbounded(pid) => Step {
                output:  pid.update(error, dt),
                settled: false,
            },
            Self::SingleBounded { pid, tolerance } => Step {
                output:  pid.update(error, dt),
                settled: error.abs() < *tolerance,
            },
            Self::DoubleBounded {
                pid,
                tolerance,
                settle_ticks,
                in_band,
            } => {
                let output = pid.update(error, dt);
                if error.abs() < *tolerance {
                    *in_band = in_band.saturating_add(1);
                } else {
                    *in_band = 0;
                }
                Step {
                    output,
                    settled: *in_band >= (*settle_ticks).max(1),
                }
            }
            Self::Open { speed, max_speed } => {
                let cap = max_speed.abs();
                Step {
                    output:  speed.clamp(-cap, cap),
                    settled: false,
                }
            }
        }
    }

    /// Clears accumulated error, previous error and the settle count.
    pub fn reset(&mut self) {
        match self {
            Self::Unbounded(pid) | Self::SingleBounded { pid, .. } => pid.reset(),
            Self::DoubleBounded { pid, in_band, .. } => {
                pid.reset();
                *in_band = 0;
            }
            Self::Open { .. } => {}
        }
    }

    /// Whether this variant can ever report settled.
    pub fn can_settle(&self) -> bool {
        matches!(self, Self::SingleBounded { .. } | Self::DoubleBounded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.01;

    fn constants() -> PidConstants { PidConstants::new(0.1, 0.01, 0.02, 0.12, 0.6) }

    #[test]
    fn bounded_variants_never_settle_outside_tolerance() {
        let tolerance = 0.5;
        let errors = [0.5, -0.5, 0.51, -3.0, 24.0, -1000.0, 1e6];
        let mut single = Controller::single_bounded(constants(), tolerance);
        let mut double = Controller::double_bounded(constants(), tolerance, 3);
        for _ in 0..10 {
            for e in errors {
                assert!(!single.step(0.0, e, DT).settled, "single settled at {e}");
                assert!(!double.step(0.0, e, DT).settled, "double settled at {e}");
            }
        }
    }

    #[test]
    fn single_bounded_settles_on_first_crossing() {
        let mut ctrl = Controller::single_bounded(constants(), 0.5);
        assert!(!ctrl.step(0.0, 2.0, DT).settled);
        assert!(ctrl.step(0.0, 0.3, DT).settled);
    }

    #[test]
    fn double_bounded_needs_exactly_n_consecutive_ticks() {
        for n in 1..=5 {
            let mut ctrl = Controller::double_bounded(constants(), 0.5, n);
            for tick in 1..n {
                assert!(!ctrl.step(0.0, 0.1, DT).settled, "n={n} settled early at tick {tick}");
            }
            assert!(ctrl.step(0.0, 0.1, DT).settled, "n={n} did not settle");
        }
    }

    #[test]
    fn double_bounded_interruption_resets_count() {
        let mut ctrl = Controller::double_bounded(constants(), 0.5, 3);
        assert!(!ctrl.step(0.0, 0.1, DT).settled);
        assert!(!ctrl.step(0.0, 0.2, DT).settled);
        // Overshoot leaves the band for one tick.
        assert!(!ctrl.step(0.0, -0.9, DT).settled);
        assert!(!ctrl.step(0.0, 0.1, DT).settled);
        assert!(!ctrl.step(0.0, 0.1, DT).settled);
        assert!(ctrl.step(0.0, 0.1, DT).settled);
    }

    #[test]
    fn open_loop_never_settles() {
        let mut ctrl = Controller::open(0.8);
        for e in [0.0, 1e-9, -0.5, 100.0] {
            for _ in 0..100 {
                let step = ctrl.step(0.0, e, DT);
                assert!(!step.settled);
                assert_eq!(step.output, 0.8);
            }
        }
    }

    #[test]
    fn open_loop_is_capped() {
        let mut ctrl = Controller::open_capped(1.5, 0.7);
        assert_eq!(ctrl.step(0.0, 10.0, DT).output, 0.7);
        let mut ctrl = Controller::open_capped(-1.5, 0.7);
        assert_eq!(ctrl.step(0.0, 10.0, DT).output, -0.7);
    }

    #[test]
    fn unbounded_never_settles() {
        let mut ctrl = Controller::unbounded(constants());
        for _ in 0..50 {
            assert!(!ctrl.step(1.0, 1.0, DT).settled);
        }
    }

    #[test]
    fn output_stays_within_limits_for_any_error() {
        let c = constants();
        let mut ctrls = [
            Controller::unbounded(c),
            Controller::single_bounded(c, 0.5),
            Controller::double_bounded(c, 0.5, 3),
        ];
        let mut e = -5000.0;
        while e <= 5000.0 {
            for ctrl in ctrls.iter_mut() {
                let out = ctrl.step(0.0, e, DT).output;
                assert!(out.abs() <= c.ceiling, "{out} exceeds ceiling at error {e}");
                assert!(out == 0.0 || out.abs() >= c.floor, "{out} below floor at error {e}");
            }
            e += 37.3;
        }
    }

    #[test]
    fn reset_clears_settle_count() {
        let mut ctrl = Controller::double_bounded(constants(), 0.5, 2);
        ctrl.step(0.0, 0.1, DT);
        ctrl.reset();
        assert!(!ctrl.step(0.0, 0.1, DT).settled);
        assert!(ctrl.step(0.0, 0.1, DT).settled);
    }

    #[test]
    fn zero_error_yields_zero_output() {
        let mut ctrl = Controller::double_bounded(constants(), 0.5, 3);
        assert_eq!(ctrl.step(5.0, 5.0, DT).output, 0.0);
    }
}
