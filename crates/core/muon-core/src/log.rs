//! Logging for firmware built on the muon driver.
//!
//! A single global sink receives every record; until one is installed,
//! output is silently discarded. [`uprint!`] / [`uprintln!`] emit raw text
//! through the sink (no level, no filtering) — prompt text and transcripts
//! go this way. The leveled macros ([`uerror!`] … [`utrace!`]) carry a
//! [`Level`] and pass through a runtime maximum-level filter.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

/// Log severity. Lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Something failed; the firmware may or may not continue.
    Error = 0,
    /// Unexpected condition, not necessarily a failure.
    Warn = 1,
    /// High-level progress messages.
    Info = 2,
    /// Detailed diagnostics.
    Debug = 3,
    /// Very verbose, low-level tracing.
    Trace = 4,
}

impl Level {
    /// Human-readable name, fixed-width for aligned output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

/// Signature of the global sink.
///
/// `level` is `None` for raw [`uprint!`] output and `Some` for leveled
/// records that passed the filter.
pub type Sink = fn(Option<Level>, fmt::Arguments<'_>);

fn null_sink(_level: Option<Level>, _args: fmt::Arguments<'_>) {}

static SINK: AtomicPtr<()> = AtomicPtr::new(null_sink as *mut ());
static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Installs the global sink. May be called again to replace it (e.g., once
/// the serial port is configured and can carry the output).
///
/// # Safety
///
/// The sink must be callable from any context the macros are used in,
/// interrupt context included if logging happens there.
pub unsafe fn set_sink(sink: Sink) {
    SINK.store(sink as *mut (), Ordering::Release);
}

/// Sets the most verbose [`Level`] that still reaches the sink.
pub fn set_max_level(level: Level) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current maximum level.
#[must_use]
pub fn max_level() -> Level {
    match MAX_LEVEL.load(Ordering::Relaxed) {
        0 => Level::Error,
        1 => Level::Warn,
        2 => Level::Info,
        3 => Level::Debug,
        _ => Level::Trace,
    }
}

/// Loads the current sink from the atomic pointer.
#[inline]
fn load_sink() -> Sink {
    let ptr = SINK.load(Ordering::Acquire);
    // SAFETY: Only valid `Sink` function pointers (or the initial
    // `null_sink`) are ever stored into SINK.
    unsafe { core::mem::transmute(ptr) }
}

/// Implementation detail of the macros. Not public API.
#[doc(hidden)]
pub fn _emit(level: Option<Level>, args: fmt::Arguments<'_>) {
    if let Some(level) = level {
        if (level as u8) > MAX_LEVEL.load(Ordering::Relaxed) {
            return;
        }
    }
    load_sink()(level, args);
}

/// Prints raw text through the log sink (no level, no filtering).
#[macro_export]
macro_rules! uprint {
    ($($arg:tt)*) => { $crate::log::_emit(None, format_args!($($arg)*)) };
}

/// Prints raw text through the log sink, with a trailing newline.
#[macro_export]
macro_rules! uprintln {
    () => { $crate::uprint!("\n") };
    ($($arg:tt)*) => { $crate::uprint!("{}\n", format_args!($($arg)*)) };
}

/// Logs a record at the given [`Level`].
#[macro_export]
macro_rules! ulog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_emit(Some($level), format_args!($($arg)*))
    };
}

/// Logs at [`Level::Error`].
#[macro_export]
macro_rules! uerror {
    ($($arg:tt)*) => { $crate::ulog!($crate::log::Level::Error, $($arg)*) };
}

/// Logs at [`Level::Warn`].
#[macro_export]
macro_rules! uwarn {
    ($($arg:tt)*) => { $crate::ulog!($crate::log::Level::Warn, $($arg)*) };
}

/// Logs at [`Level::Info`].
#[macro_export]
macro_rules! uinfo {
    ($($arg:tt)*) => { $crate::ulog!($crate::log::Level::Info, $($arg)*) };
}

/// Logs at [`Level::Debug`].
#[macro_export]
macro_rules! udebug {
    ($($arg:tt)*) => { $crate::ulog!($crate::log::Level::Debug, $($arg)*) };
}

/// Logs at [`Level::Trace`].
#[macro_export]
macro_rules! utrace {
    ($($arg:tt)*) => { $crate::ulog!($crate::log::Level::Trace, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The sink and filter are process-global, so everything that touches
    // them lives in one test.
    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn capture_sink(level: Option<Level>, args: fmt::Arguments<'_>) {
        let prefix = level.map_or("raw", Level::name);
        CAPTURED.lock().unwrap().push(format!("{prefix}|{args}"));
    }

    #[test]
    fn sink_receives_filtered_records() {
        // SAFETY: The capture sink is callable from any context.
        unsafe { set_sink(capture_sink) };
        set_max_level(Level::Info);
        assert_eq!(max_level(), Level::Info);

        uprint!("prompt> ");
        uinfo!("configured at {} baud", 9600);
        udebug!("must be filtered out");
        set_max_level(Level::Debug);
        udebug!("now visible");

        let captured = CAPTURED.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "raw|prompt> ".to_string(),
                "INFO |configured at 9600 baud".to_string(),
                "DEBUG|now visible".to_string(),
            ]
        );
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Info);
        assert!(Level::Info < Level::Debug);
        assert!(Level::Debug < Level::Trace);
        assert_eq!(Level::Warn.name(), "WARN ");
    }
}
