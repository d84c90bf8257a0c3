//! Utilities: leveled logging with a dynamic global level.
//!
//! Key items:
//!   init_logging / derive_level
//!   log_debug! / log_trace!
//!
//! Transport failure detail goes through `log_debug!` so it reaches the
//! terminal only under `-v`; the user-facing message is the Outcome.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum LogLevel {
    Error = 0,
    Info = 1,
    Debug = 2,
    Trace = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

static GLOBAL_LEVEL: OnceLock<AtomicU8> = OnceLock::new();

fn level_cell() -> &'static AtomicU8 {
    GLOBAL_LEVEL.get_or_init(|| AtomicU8::new(LogLevel::Error as u8))
}

pub fn init_logging(level: LogLevel) {
    level_cell().store(level as u8, Ordering::Relaxed);
}

pub fn current_log_level() -> LogLevel {
    match level_cell().load(Ordering::Relaxed) {
        0 => LogLevel::Error,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

/// Map -v / -q flags onto a level. Quiet wins over verbosity. The default
/// is Error: the shell's own rendering is the normal output channel, so
/// diagnostics stay silent unless asked for.
pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
    if quiet {
        return LogLevel::Error;
    }
    match verbose {
        0 => LogLevel::Error,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Diagnostics go to stderr so they never mix with shell/JSON output.
pub fn log(level: LogLevel, msg: impl AsRef<str>) {
    if level <= current_log_level() {
        eprintln!("[{}][{}] {}", level.as_str(), timestamp_ms(), msg.as_ref());
    }
}

pub fn debug(msg: impl AsRef<str>) {
    log(LogLevel::Debug, msg);
}
pub fn trace(msg: impl AsRef<str>) {
    log(LogLevel::Trace, msg);
}

#[macro_export]
macro_rules! log_debug {
    ($($t:tt)*) => { $crate::utils::debug(format!($($t)*)) };
}
#[macro_export]
macro_rules! log_trace {
    ($($t:tt)*) => { $crate::utils::trace(format!($($t)*)) };
}
