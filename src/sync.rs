//! Single-writer state shared between the background loops and the route.
//!
//! The vexide executor is single-threaded and cooperative: a task only yields
//! at an `.await`. A [`Latest`] cell is read or written in one step with no
//! `.await` in between, so readers always observe a whole value, never a
//! half-written [`Pose`](crate::motion::odom::Pose).
//!
//! Every cell has exactly one writer. Readers see the value from the writer's
//! most recent tick, which bounds staleness to one loop period.

use std::{cell::Cell, fmt, rc::Rc};

/// A one-slot "latest value" cell with cheap clonable handles.
pub struct Latest<T: Copy>(Rc<Cell<T>>);

impl<T: Copy> Latest<T> {
    pub fn new(value: T) -> Self { Self(Rc::new(Cell::new(value))) }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T { self.0.get() }

    /// Replaces the current value.
    pub fn set(&self, value: T) { self.0.set(value) }

    /// Applies `f` to the current value and stores the result.
    pub fn update(&self, f: impl FnOnce(T) -> T) { self.0.set(f(self.0.get())) }
}

impl<T: Copy> Clone for Latest<T> {
    fn clone(&self) -> Self { Self(Rc::clone(&self.0)) }
}

impl<T: Copy + Default> Default for Latest<T> {
    fn default() -> Self { Self::new(T::default()) }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Latest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Latest").field(&self.get()).finish()
    }
}
