use std::fmt;

/// A 2D position with heading.
///
/// Headings are radians, counter-clockwise positive, and accumulate without
/// wrapping: after two full left turns the heading reads `4π`, not zero. This
/// lets a route encode the direction of a turn in its target, e.g. turning to
/// `404.87°` from `44.88°` is a full extra revolution to the left.
///
/// # Example
///
/// ```ignore
/// use talos::motion::odom::Pose;
///
/// let start = Pose::new(18.5, 91.2, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// The x-coordinate in inches.
    pub x:       f64,
    /// The y-coordinate in inches.
    pub y:       f64,
    /// The accumulated heading in radians.
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self { Self { x, y, heading } }

    /// The pose at (0, 0) facing along +x.
    pub const fn origin() -> Self { Self::new(0.0, 0.0, 0.0) }

    /// Straight-line distance to `other`.
    pub fn distance(&self, other: &Pose) -> f64 { (other.x - self.x).hypot(other.y - self.y) }

    /// Displacement from `from` to `self`, projected onto the unit vector at
    /// `heading`.
    pub fn projected_from(&self, from: &Pose, heading: f64) -> f64 {
        (self.x - from.x) * heading.cos() + (self.y - from.y) * heading.sin()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}) @ {:.2}°", self.x, self.y, self.heading.to_degrees())
    }
}
