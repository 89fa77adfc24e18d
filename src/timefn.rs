//! Monotonic phase timing for the benchmark front end.
//!
//! `std::time::Instant` is monotonic on every supported platform, so a
//! stopwatch is just a captured start point.

use std::time::Instant;

/// Wall-clock stopwatch; starts running when constructed.
#[derive(Clone, Copy)]
pub struct StopWatch {
    start: Instant,
}

impl StopWatch {
    pub fn new() -> Self {
        StopWatch {
            start: Instant::now(),
        }
    }

    /// Nanoseconds elapsed since construction.
    pub fn elapsed_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    /// Seconds elapsed since construction.
    pub fn elapsed_sec(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for StopWatch {
    fn default() -> Self {
        StopWatch::new()
    }
}
