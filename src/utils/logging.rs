//! Logger setup plus switchable logging macros.
//!
//! Modules opt into the macros by defining a flag first:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_info, log_warn};
//!
//! log_info!("cycle {} started", id);
//! ```
//! Flipping the flag to `false` silences that module without touching
//! `RUST_LOG`.

use env_logger::Env;

/// Reads `RUST_LOG`; falls back to `info`, or `debug` when `debug` is set.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

/// `POMODORO_DEBUG=1` or `POMODORO_DEBUG=true`.
pub fn debug_mode() -> bool {
    std::env::var("POMODORO_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
