//! Time sources for turbulence.
//!
//! Turbulence is a function of elapsed time rather than of the `dt` sequence,
//! so the clock is injected to keep simulations replayable under test.

use instant::Instant;
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    /// Seconds since an arbitrary, fixed epoch.
    fn now_secs(&self) -> f64;
}

/// Monotonic wall clock measured from construction.
#[derive(Clone, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock. Clones share the same reading.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    secs: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(secs: f64) -> Self {
        Self {
            secs: Rc::new(Cell::new(secs)),
        }
    }

    pub fn set(&self, secs: f64) {
        self.secs.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.secs.set(self.secs.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.secs.get()
    }
}
