//! Time sources
//!
//! Hosts never read the wall clock directly. They take a [`Clock`], and
//! tests and scripted sessions drive it by hand.

use std::cell::Cell;
use std::rc::Rc;

/// Monotonic millisecond time source
pub trait Clock {
    /// Returns milliseconds since the clock's origin
    fn now_ms(&self) -> u64;
}

/// Clock that only moves when told to
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the code under test.
///
/// # Examples
///
/// ```
/// use services_timer::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let shared = clock.clone();
/// clock.advance(550);
/// assert_eq!(shared.now_ms(), 550);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock at time 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock at `start_ms`
    pub fn starting_at(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Moves time forward by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }

    /// Moves time forward to `now_ms`
    ///
    /// Earlier values are ignored; the clock is monotonic.
    pub fn set(&self, now_ms: u64) {
        if now_ms > self.now.get() {
            self.now.set(now_ms);
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
