#![deny(missing_docs)]
//! Shared logging utilities for the notifier workspace.
//!
//! This crate provides the `notifier_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is tagged
//! with the poll cycle that emitted it.

use std::sync::atomic::{AtomicU64, Ordering};

#[doc(hidden)]
pub use log;

/// Poll cycle currently being processed. The poll loop may hop between
/// runtime worker threads, so this is process-wide rather than thread-local.
static POLL_CYCLE: AtomicU64 = AtomicU64::new(0);

/// Sets the poll cycle number. Called by the dispatch loop once per cycle.
pub fn set_poll_cycle(cycle: u64) {
    POLL_CYCLE.store(cycle, Ordering::Relaxed);
}

/// Retrieves the poll cycle number.
/// Returns 0 before the first cycle has started.
pub fn current_poll_cycle() -> u64 {
    POLL_CYCLE.load(Ordering::Relaxed)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __notifier_log {
    ($level:expr, $($arg:tt)*) => {{
        $crate::log::log!(
            $level,
            "[cycle {}] {}",
            $crate::current_poll_cycle(),
            format_args!($($arg)*)
        );
    }};
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! notifier_trace {
    ($($arg:tt)*) => {
        $crate::__notifier_log!($crate::log::Level::Trace, $($arg)*)
    };
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! notifier_info {
    ($($arg:tt)*) => {
        $crate::__notifier_log!($crate::log::Level::Info, $($arg)*)
    };
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! notifier_debug {
    ($($arg:tt)*) => {
        $crate::__notifier_log!($crate::log::Level::Debug, $($arg)*)
    };
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! notifier_warn {
    ($($arg:tt)*) => {
        $crate::__notifier_log!($crate::log::Level::Warn, $($arg)*)
    };
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! notifier_error {
    ($($arg:tt)*) => {
        $crate::__notifier_log!($crate::log::Level::Error, $($arg)*)
    };
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
