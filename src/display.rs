// display.rs: process-wide notification level and stderr display macros.
//
// The library stays silent unless the level is raised; the `lz4pack` binary
// starts at 2 and moves it with -v / -q.
//
//   display!(...)          → eprint!(...)
//   displaylevel!(l, ...)  → if display_level() >= l { eprint!(...) }

use std::sync::atomic::{AtomicI32, Ordering};

/// Global notification level. 0 = silent, 1 = errors only, 2 = results +
/// warnings, 3 = progress, 4+ = verbose.
pub static DISPLAY_LEVEL: AtomicI32 = AtomicI32::new(0);

/// Returns the current display level.
#[inline]
pub fn display_level() -> i32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: i32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Print to stderr.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Conditionally print to stderr at or above `level`; flushes stderr at
/// level 4 and up.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::display::display_level() >= $level {
            eprint!($($arg)*);
            if $crate::display::display_level() >= 4 {
                let _ = ::std::io::Write::flush(&mut ::std::io::stderr());
            }
        }
    };
}
