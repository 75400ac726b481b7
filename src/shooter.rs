//! Timed multi-disc firing sequence.
//!
//! A shot primes the launcher by running the intake with the indexer open,
//! waits (bounded) for the flywheel to reach speed, then feeds discs with a
//! fixed pattern of intake pulses. The sequence is open loop: after the
//! spin-up wait it never looks at the launcher again.
//!
//! ```ignore
//! let shooter = Shooter::new(flywheel.clone(), indexer, intake, VexClock);
//!
//! flywheel.set_velocity(3212.0);
//! // ... drive into position ...
//! let report = shooter.shoot().await;
//! ```

use std::time::Duration;

use log::{debug, info, warn};

use crate::{
    peripherals::{Indexer, Intake, Launcher},
    time::Clock,
};

/// Polling rate of the sequencer in milliseconds.
const LOOPRATE: u64 = 10;

/// One intake pulse followed by a pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub on:  Duration,
    pub gap: Duration,
}

impl Pulse {
    pub const fn new(on_ms: u64, gap_ms: u64) -> Self {
        Self {
            on:  Duration::from_millis(on_ms),
            gap: Duration::from_millis(gap_ms),
        }
    }
}

/// The intake effort profile used while discs are fed.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstPattern {
    pub pulses: Vec<Pulse>,
    /// Intake effort during the "on" part of a pulse.
    pub effort: f64,
}

impl BurstPattern {
    /// Intake effort `elapsed` after the first pulse started. Zero once the
    /// last pulse has finished.
    pub fn effort_at(&self, elapsed: Duration) -> f64 {
        let mut start = Duration::ZERO;
        for pulse in &self.pulses {
            if elapsed < start + pulse.on {
                return if elapsed >= start { self.effort } else { 0.0 };
            }
            start += pulse.on + pulse.gap;
        }
        0.0
    }

    /// Time from the start of the first pulse to the end of the last one.
    pub fn duration(&self) -> Duration {
        let total: Duration = self.pulses.iter().map(|p| p.on + p.gap).sum();
        total - self.pulses.last().map_or(Duration::ZERO, |p| p.gap)
    }
}

impl Default for BurstPattern {
    /// Three discs: two short pulses, then a long one to clear the last disc.
    fn default() -> Self {
        Self {
            pulses: vec![Pulse::new(110, 220), Pulse::new(110, 220), Pulse::new(300, 0)],
            effort: 1.0,
        }
    }
}

/// Timing of one shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotPlan {
    /// How long the intake runs with the indexer open before anything else.
    pub pre_roll:       Duration,
    /// Upper bound on waiting for the launcher to reach speed.
    pub spinup_timeout: Duration,
    /// How long the burst pattern is played. The intake stays off for the
    /// rest of the window once the pattern ends.
    pub window:         Duration,
    pub pattern:        BurstPattern,
}

impl Default for ShotPlan {
    fn default() -> Self {
        Self {
            pre_roll:       Duration::from_millis(500),
            spinup_timeout: Duration::from_millis(3000),
            window:         Duration::from_millis(6000),
            pattern:        BurstPattern::default(),
        }
    }
}

/// What happened during a shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotReport {
    /// Whether the launcher reported ready before the burst started.
    pub spun_up: bool,
    /// Total time spent in [`Shooter::shoot`].
    pub elapsed: Duration,
}

/// Coordinates the intake and indexer with the launcher.
pub struct Shooter<L, X, I, C> {
    pub launcher: L,
    pub indexer:  X,
    pub intake:   I,
    pub clock:    C,
    pub plan:     ShotPlan,
}

impl<L: Launcher, X: Indexer, I: Intake, C: Clock> Shooter<L, X, I, C> {
    /// A shooter using the default [`ShotPlan`].
    pub fn new(launcher: L, indexer: X, intake: I, clock: C) -> Self {
        Self {
            launcher,
            indexer,
            intake,
            clock,
            plan: ShotPlan::default(),
        }
    }

    pub fn with_plan(mut self, plan: ShotPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Fires one volley.
    ///
    /// A launcher that never reaches speed does not abort the shot: the
    /// discs are fed anyway once the spin-up timeout expires.
    pub async fn shoot(&self) -> ShotReport {
        let started = self.clock.now();
        let tick = Duration::from_millis(LOOPRATE);

        self.set_intake(1.0);
        if let Err(e) = self.indexer.set_open(true) {
            warn!("Indexer write failed: {}", e);
        }
        self.clock.sleep(self.plan.pre_roll).await;

        let mut spun_up = self.launcher.at_target_velocity();
        if !spun_up {
            self.set_intake(0.0);
            let waiting = self.clock.now();
            while !spun_up && self.clock.now() - waiting < self.plan.spinup_timeout {
                self.clock.sleep(tick).await;
                spun_up = self.launcher.at_target_velocity();
            }
            if spun_up {
                debug!("Launcher ready after {}", humantime::format_duration(self.clock.now() - waiting));
            } else {
                warn!(
                    "Launcher not at speed after {}, firing anyway",
                    humantime::format_duration(self.plan.spinup_timeout)
                );
            }
        }

        let burst = self.clock.now();
        loop {
            let elapsed = self.clock.now() - burst;
            if elapsed >= self.plan.window {
                break;
            }
            self.set_intake(self.plan.pattern.effort_at(elapsed));
            self.clock.sleep(tick).await;
        }
        self.set_intake(0.0);

        let elapsed = self.clock.now() - started;
        info!("Shot fired in {}", humantime::format_duration(elapsed));
        ShotReport { spun_up, elapsed }
    }

    fn set_intake(&self, effort: f64) {
        if let Err(e) = self.intake.set_effort(effort) {
            warn!("Intake write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::sim::Sim;

    fn ms(ms: u64) -> Duration { Duration::from_millis(ms) }

    fn shooter(sim: &Sim) -> Shooter<Sim, Sim, Sim, Sim> {
        Shooter::new(sim.clone(), sim.clone(), sim.clone(), sim.clone())
    }

    #[test]
    fn burst_pattern_timing() {
        let pattern = BurstPattern::default();
        assert_eq!(pattern.effort_at(ms(0)), 1.0);
        assert_eq!(pattern.effort_at(ms(109)), 1.0);
        assert_eq!(pattern.effort_at(ms(110)), 0.0);
        assert_eq!(pattern.effort_at(ms(329)), 0.0);
        assert_eq!(pattern.effort_at(ms(330)), 1.0);
        assert_eq!(pattern.effort_at(ms(440)), 0.0);
        assert_eq!(pattern.effort_at(ms(660)), 1.0);
        assert_eq!(pattern.effort_at(ms(959)), 1.0);
        assert_eq!(pattern.effort_at(ms(960)), 0.0);
        assert_eq!(pattern.duration(), ms(960));
    }

    #[test]
    fn ready_launcher_skips_spinup_wait() {
        let sim = Sim::new();
        sim.world().launcher_ready_at = Some(Duration::ZERO);

        let report = block_on(shooter(&sim).shoot());

        assert!(report.spun_up);
        assert_eq!(report.elapsed, ms(500 + 6000));
        // The intake never paused between the pre-roll and the first pulse.
        let log = sim.intake_log();
        assert_eq!(log[0], (Duration::ZERO, 1.0));
        assert!(log.iter().all(|(t, e)| *t >= ms(500) || *e == 1.0));
    }

    #[test]
    fn slow_spinup_waits_until_ready() {
        let sim = Sim::new();
        sim.world().launcher_ready_at = Some(ms(1200));

        let report = block_on(shooter(&sim).shoot());

        assert!(report.spun_up);
        assert_eq!(report.elapsed, ms(1200 + 6000));
        assert!(sim.intake_log().contains(&(ms(500), 0.0)));
    }

    #[test]
    fn spinup_timeout_still_fires() {
        let sim = Sim::new();

        let report = block_on(shooter(&sim).shoot());

        assert!(!report.spun_up);
        let expected = ms(500 + 3000 + 6000);
        assert!(report.elapsed >= expected && report.elapsed <= expected + ms(20));

        let burst_start = report.elapsed - ms(6000);
        let fed = sim
            .intake_log()
            .into_iter()
            .filter(|(t, e)| *t >= burst_start && *e > 0.0)
            .count();
        assert_eq!(fed, (110 + 110 + 300) / 10);
        assert_eq!(sim.intake_log().last(), Some(&(report.elapsed, 0.0)));
        assert_eq!(sim.world().indexer, vec![(Duration::ZERO, true)]);
    }

    #[test]
    fn default_window_outlasts_pattern() {
        let plan = ShotPlan::default();
        assert_eq!(plan.window, ms(6000));
        assert!(plan.window > plan.pattern.duration());
    }

    #[test]
    fn shorter_window_truncates_sequence() {
        let sim = Sim::new();
        sim.world().launcher_ready_at = Some(Duration::ZERO);
        let plan = ShotPlan {
            window: ms(1000),
            ..ShotPlan::default()
        };

        let report = block_on(shooter(&sim).with_plan(plan).shoot());

        assert_eq!(report.elapsed, ms(500 + 1000));
        assert_eq!(sim.intake_log().last(), Some(&(report.elapsed, 0.0)));
    }
}
