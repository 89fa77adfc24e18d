//! Process-wide verbosity control for diagnostics.
//!
//! Levels: 0 = silent, 1 = errors only, 2 = normal (default), 3 = detail,
//! 4 = debug trace. Diagnostics go to stderr so benchmark output on stdout
//! stays machine-readable.

use std::sync::atomic::{AtomicU32, Ordering};

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Conditionally print to stderr at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::notify::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
