//! Host-side simulation used by the async tests.
//!
//! [`Sim`] is a discrete-event clock and a set of fake devices behind one
//! shared world. Every `sleep` registers a deadline; time only advances to
//! the earliest pending deadline, so concurrent loops interleave at their own
//! tick rates. Whenever time advances, the drivetrain and flywheel plants are
//! stepped over the elapsed interval with the efforts last applied to them.
//! Both plants are first order: wheel speed lags effort by a time constant.

use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
    time::Duration,
};

use crate::{
    error::DeviceError,
    motion::odom::{OdomTracker, Pose},
    peripherals::{BrakeMode, Chassis, FlywheelMotor, Halt, Indexer, Intake, Launcher},
    time::Clock,
};

/// Integration step of the drivetrain plant in seconds.
const DRIVE_SUBSTEP: f64 = 0.001;

pub(crate) struct World {
    now:      Duration,
    next_id:  u64,
    sleepers: Vec<(u64, Duration)>,

    pub pose:        Pose,
    pub left:        f64,
    pub right:       f64,
    /// Side speeds in inches per second.
    pub v_left:      f64,
    pub v_right:     f64,
    /// Side speed at full effort, in inches per second.
    pub max_speed:   f64,
    /// Drivetrain time constant in seconds; zero tracks effort instantly.
    pub drive_tau:   f64,
    pub track_width: f64,
    pub brake:       BrakeMode,
    pub efforts:     Vec<(f64, f64)>,
    publish:         Option<OdomTracker>,

    pub flywheel_speed:  f64,
    pub flywheel_effort: f64,
    /// Flywheel speed at full effort.
    pub flywheel_max:    f64,
    /// Flywheel time constant in seconds.
    pub flywheel_tau:    f64,
    pub flywheel_error:  Option<DeviceError>,

    /// When the fake launcher starts reporting ready; never if `None`.
    pub launcher_ready_at: Option<Duration>,

    pub intake:  Vec<(Duration, f64)>,
    pub indexer: Vec<(Duration, bool)>,
    pub halted:  Vec<&'static str>,
}

impl World {
    fn advance_to(&mut self, t: Duration) {
        if t <= self.now {
            return;
        }
        let dt = (t - self.now).as_secs_f64();
        self.now = t;

        let steps = (dt / DRIVE_SUBSTEP).ceil().max(1.0);
        for _ in 0..steps as u32 {
            self.step_drive(dt / steps);
        }
        if let Some(odom) = &self.publish {
            odom.reset_from_pose(self.pose);
        }

        let steady = self.flywheel_effort.clamp(-1.0, 1.0) * self.flywheel_max;
        self.flywheel_speed = steady + (self.flywheel_speed - steady) * (-dt / self.flywheel_tau).exp();
    }

    fn step_drive(&mut self, h: f64) {
        let target_l = self.left.clamp(-1.0, 1.0) * self.max_speed;
        let target_r = self.right.clamp(-1.0, 1.0) * self.max_speed;
        let (next_l, next_r) = if self.drive_tau > 0.0 {
            let decay = (-h / self.drive_tau).exp();
            (
                target_l + (self.v_left - target_l) * decay,
                target_r + (self.v_right - target_r) * decay,
            )
        } else {
            (target_l, target_r)
        };
        let (v_l, v_r) = if self.drive_tau > 0.0 {
            ((self.v_left + next_l) / 2.0, (self.v_right + next_r) / 2.0)
        } else {
            (next_l, next_r)
        };
        self.v_left = next_l;
        self.v_right = next_r;

        let v = (v_l + v_r) / 2.0;
        let w = (v_r - v_l) / self.track_width;
        let th = self.pose.heading;
        if w.abs() < 1e-12 {
            self.pose.x += v * h * th.cos();
            self.pose.y += v * h * th.sin();
        } else {
            let th2 = th + w * h;
            self.pose.x += v / w * (th2.sin() - th.sin());
            self.pose.y -= v / w * (th2.cos() - th.cos());
            self.pose.heading = th2;
        }
    }
}

/// Shared handle to the simulated world.
#[derive(Clone)]
pub(crate) struct Sim(Rc<RefCell<World>>);

impl Sim {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(World {
            now:               Duration::ZERO,
            next_id:           0,
            sleepers:          Vec::new(),
            pose:              Pose::origin(),
            left:              0.0,
            right:             0.0,
            v_left:            0.0,
            v_right:           0.0,
            max_speed:         60.0,
            drive_tau:         0.1,
            track_width:       12.0,
            brake:             BrakeMode::Coast,
            efforts:           Vec::new(),
            publish:           None,
            flywheel_speed:    0.0,
            flywheel_effort:   0.0,
            flywheel_max:      3600.0,
            flywheel_tau:      0.3,
            flywheel_error:    None,
            launcher_ready_at: None,
            intake:            Vec::new(),
            indexer:           Vec::new(),
            halted:            Vec::new(),
        })))
    }

    /// Mirrors the true chassis pose into `odom` after every step.
    pub fn publish_to(&self, odom: &OdomTracker) {
        let mut world = self.0.borrow_mut();
        odom.reset_from_pose(world.pose);
        world.publish = Some(odom.clone());
    }

    pub fn world(&self) -> std::cell::RefMut<'_, World> { self.0.borrow_mut() }

    pub fn pose(&self) -> Pose { self.0.borrow().pose }

    pub fn efforts(&self) -> Vec<(f64, f64)> { self.0.borrow().efforts.clone() }

    pub fn intake_log(&self) -> Vec<(Duration, f64)> { self.0.borrow().intake.clone() }
}

pub(crate) struct SimSleep {
    sim:      Sim,
    duration: Duration,
    ticket:   Option<(u64, Duration)>,
}

impl Future for SimSleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = &mut *self;
        let mut world = this.sim.0.borrow_mut();
        match this.ticket {
            None => {
                let id = world.next_id;
                world.next_id += 1;
                let deadline = world.now + this.duration;
                world.sleepers.push((id, deadline));
                this.ticket = Some((id, deadline));
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Some((id, deadline)) if world.now >= deadline => {
                world.sleepers.retain(|(i, _)| *i != id);
                this.ticket = None;
                Poll::Ready(())
            }
            Some((_, deadline)) => {
                let earliest = world
                    .sleepers
                    .iter()
                    .map(|(_, d)| *d)
                    .min()
                    .unwrap_or(deadline);
                world.advance_to(earliest);
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}

impl Drop for SimSleep {
    fn drop(&mut self) {
        if let Some((id, _)) = self.ticket {
            if let Ok(mut world) = self.sim.0.try_borrow_mut() {
                world.sleepers.retain(|(i, _)| *i != id);
            }
        }
    }
}

impl Clock for Sim {
    fn now(&self) -> Duration { self.0.borrow().now }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        SimSleep {
            sim: self.clone(),
            duration,
            ticket: None,
        }
    }
}

impl Chassis for Sim {
    fn set_efforts(&self, left: f64, right: f64) -> Result<(), DeviceError> {
        let mut world = self.0.borrow_mut();
        world.left = left;
        world.right = right;
        world.efforts.push((left, right));
        Ok(())
    }

    fn set_brake_mode(&self, mode: BrakeMode) -> Result<(), DeviceError> {
        self.0.borrow_mut().brake = mode;
        Ok(())
    }
}

impl FlywheelMotor for Sim {
    fn velocity(&self) -> Result<f64, DeviceError> {
        let world = self.0.borrow();
        match world.flywheel_error {
            Some(e) => Err(e),
            None => Ok(world.flywheel_speed),
        }
    }

    fn set_effort(&self, effort: f64) -> Result<(), DeviceError> {
        self.0.borrow_mut().flywheel_effort = effort;
        Ok(())
    }
}

impl Launcher for Sim {
    fn set_velocity(&self, _target: f64) {}

    fn at_target_velocity(&self) -> bool {
        let world = self.0.borrow();
        world.launcher_ready_at.is_some_and(|t| world.now >= t)
    }
}

impl Intake for Sim {
    fn set_effort(&self, effort: f64) -> Result<(), DeviceError> {
        let mut world = self.0.borrow_mut();
        let now = world.now;
        world.intake.push((now, effort));
        Ok(())
    }
}

impl Indexer for Sim {
    fn set_open(&self, open: bool) -> Result<(), DeviceError> {
        let mut world = self.0.borrow_mut();
        let now = world.now;
        world.indexer.push((now, open));
        Ok(())
    }
}

impl Halt for Sim {
    fn name(&self) -> &'static str { "sim" }

    fn halt(&self) -> Result<(), DeviceError> {
        let mut world = self.0.borrow_mut();
        world.left = 0.0;
        world.right = 0.0;
        world.flywheel_effort = 0.0;
        world.halted.push("sim");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::{executor::block_on, future::join};

    use super::*;

    #[test]
    fn concurrent_sleepers_interleave() {
        let sim = Sim::new();
        let log = RefCell::new(Vec::new());
        let fast = async {
            for _ in 0..5 {
                sim.sleep(Duration::from_millis(10)).await;
                log.borrow_mut().push(("fast", sim.now()));
            }
        };
        let slow = async {
            sim.sleep(Duration::from_millis(25)).await;
            log.borrow_mut().push(("slow", sim.now()));
        };
        block_on(join(fast, slow));

        let log = log.into_inner();
        let slow_at = log.iter().position(|(who, _)| *who == "slow").expect("slow ran");
        assert_eq!(log[slow_at].1, Duration::from_millis(25));
        assert_eq!(log.iter().filter(|(who, _)| *who == "fast").count(), 5);
        assert_eq!(sim.now(), Duration::from_millis(50));
    }

    #[test]
    fn instant_drivetrain_drives_straight() {
        let sim = Sim::new();
        sim.world().drive_tau = 0.0;
        sim.set_efforts(1.0, 1.0).expect("sim");
        block_on(sim.sleep(Duration::from_millis(500)));
        let pose = sim.pose();
        assert!((pose.x - 30.0).abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
    }

    #[test]
    fn drivetrain_speed_lags_effort() {
        let sim = Sim::new();
        sim.set_efforts(1.0, 1.0).expect("sim");
        block_on(sim.sleep(Duration::from_millis(100)));
        let speed = sim.world().v_left;
        // One time constant: 1 - 1/e of full speed.
        assert!((speed - 60.0 * (1.0 - (-1.0f64).exp())).abs() < 1e-6);
        block_on(sim.sleep(Duration::from_millis(400)));
        let pose = sim.pose();
        assert!(pose.x > 20.0 && pose.x < 30.0, "travelled to {pose}");
        assert!(pose.y.abs() < 1e-9);
    }
}
