use super::sensors::{OdomReading, TrackerOffsets};

/// Change in global pose produced by one odometry tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseDelta {
    pub x:       f64,
    pub y:       f64,
    pub heading: f64,
}

/// Turns successive raw readings into global pose deltas.
///
/// Uses the arc method from the Pilons tracking paper: between two ticks the
/// robot is assumed to travel along a circular arc, so the local displacement
/// is the chord of that arc rather than the raw wheel travel.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    prev:    OdomReading,
    offsets: TrackerOffsets,
}

impl Integrator {
    /// Starts integrating from `baseline`.
    pub fn new(baseline: OdomReading, offsets: TrackerOffsets) -> Self {
        Self {
            prev: baseline,
            offsets,
        }
    }

    /// Consumes a new reading and returns the global displacement.
    ///
    /// `heading` is the estimator's heading before this tick; the local chord
    /// is rotated by the average heading over the tick.
    pub fn advance(&mut self, reading: OdomReading, heading: f64) -> PoseDelta {
        let delta_t = reading.rotation - self.prev.rotation;
        let delta_v = reading.vertical - self.prev.vertical;
        let delta_h = reading.horizontal - self.prev.horizontal;
        self.prev = reading;

        let (forward, left) = if delta_t == 0.0 {
            (delta_v, delta_h)
        } else {
            (
                local_calc(delta_t, delta_v, self.offsets.vertical),
                local_calc(delta_t, delta_h, self.offsets.horizontal),
            )
        };

        let avg_t = heading + delta_t / 2.0;
        let (x, y) = rotate_vec(forward, left, avg_t);
        PoseDelta {
            x,
            y,
            heading: delta_t,
        }
    }
}

/// Chord length of the arc travelled by the tracking center, given one
/// wheel's travel and its offset from that center.
fn local_calc(delta_t: f64, delta_dist: f64, offset: f64) -> f64 {
    2.0 * (delta_t / 2.0).sin() * (delta_dist / delta_t + offset)
}

fn rotate_vec(x: f64, y: f64, t: f64) -> (f64, f64) {
    let new_x = x * t.cos() - y * t.sin();
    let new_y = x * t.sin() + y * t.cos();
    (new_x, new_y)
}
