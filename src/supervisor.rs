//! Autonomous supervisor.
//!
//! The route runs under a [`Supervisor`] that watches for faults in parallel.
//! Two things abort the route: a fault raised into the shared [`FaultSlot`]
//! (e.g. the heading sensor disconnecting), or a watched background loop
//! whose [`Heartbeat`] stops advancing. On abort the route future is dropped
//! mid-step and every registered actuator is halted.
//!
//! ```ignore
//! let supervisor = Supervisor::new(VexClock, faults.clone())
//!     .watch("odometry", odom.heartbeat())
//!     .watch("flywheel", flywheel.heartbeat())
//!     .halt_on_fault(drivetrain.clone())
//!     .halt_on_fault(flywheel.clone());
//!
//! supervisor.run(route(&robot)).await?;
//! ```

use std::{future::Future, pin::pin, time::Duration};

use futures::future::{Either, select};
use log::{error, info, warn};

use crate::{
    error::{Fault, FaultSlot},
    peripherals::Halt,
    sync::Latest,
    time::Clock,
};

/// Loop rate for the watchdog in milliseconds.
const LOOPRATE: u64 = 10;

/// Default silence after which a watched loop is considered dead.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(250);

/// Timestamp of a loop's last successful tick.
#[derive(Debug, Clone, Default)]
pub struct Heartbeat(Latest<Option<Duration>>);

impl Heartbeat {
    /// Records a successful tick at `now`.
    pub fn beat(&self, now: Duration) { self.0.set(Some(now)) }

    /// The time of the last successful tick, if there has been one.
    pub fn last(&self) -> Option<Duration> { self.0.get() }
}

pub struct Supervisor<C: Clock> {
    clock:       C,
    faults:      FaultSlot,
    stale_after: Duration,
    watched:     Vec<(&'static str, Heartbeat)>,
    halts:       Vec<Box<dyn Halt>>,
}

impl<C: Clock> Supervisor<C> {
    pub fn new(clock: C, faults: FaultSlot) -> Self {
        Self {
            clock,
            faults,
            stale_after: DEFAULT_STALE_AFTER,
            watched: Vec::new(),
            halts: Vec::new(),
        }
    }

    /// Overrides how long a watched loop may stay silent.
    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Adds a background loop to the staleness watchdog.
    pub fn watch(mut self, task: &'static str, heartbeat: Heartbeat) -> Self {
        self.watched.push((task, heartbeat));
        self
    }

    /// Registers an actuator to be stopped when the route is aborted.
    pub fn halt_on_fault(mut self, device: impl Halt + 'static) -> Self {
        self.halts.push(Box::new(device));
        self
    }

    /// Returns the fault that should abort the route, if any.
    ///
    /// A loop that has never ticked is measured from `started`.
    pub fn check(&self, started: Duration) -> Option<Fault> {
        if let Some(fault) = self.faults.pending() {
            return Some(fault);
        }

        let now = self.clock.now();
        for (task, heartbeat) in &self.watched {
            let silent_for = now.saturating_sub(heartbeat.last().unwrap_or(started).max(started));
            if silent_for > self.stale_after {
                let fault = Fault::Stale {
                    task: *task,
                    silent_for,
                };
                self.faults.raise(fault);
                return self.faults.pending();
            }
        }
        None
    }

    /// Stops every registered actuator. A failing device does not prevent
    /// the others from being halted.
    pub fn halt_all(&self) {
        for device in &self.halts {
            if let Err(e) = device.halt() {
                warn!("Failed to halt {}: {}", device.name(), e);
            }
        }
    }

    /// Runs `route` to completion unless a fault occurs first.
    ///
    /// On a fault the route is cancelled at its current await point, all
    /// registered actuators are halted and the fault is returned.
    pub async fn run<T>(&self, route: impl Future<Output = T>) -> Result<T, Fault> {
        let started = self.clock.now();
        let watchdog = async {
            loop {
                if let Some(fault) = self.check(started) {
                    return fault;
                }
                self.clock.sleep(Duration::from_millis(LOOPRATE)).await;
            }
        };

        match select(pin!(route), pin!(watchdog)).await {
            Either::Left((value, _)) => {
                info!("Route finished in {}", humantime::format_duration(self.clock.now() - started));
                Ok(value)
            }
            Either::Right((fault, _)) => {
                error!("Route aborted: {}", fault);
                self.halt_all();
                Err(fault)
            }
        }
    }
}
