//! Bridges the Rust `log` facade to a host-provided logger.
//!
//! The core logs through the standard [`log`] macros; the host app installs
//! a [`Logger`] implementation once at startup via [`set_logger`] and
//! receives every record from then on. Records logged before a logger is
//! installed fall back to stderr.

use std::sync::{Arc, OnceLock};

/// Severity of a forwarded log record.
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing output.
    Trace,
    /// Debugging information.
    Debug,
    /// Normal operational messages.
    Info,
    /// Something unexpected that the core recovered from.
    Warn,
    /// A failed operation.
    Error,
}

/// Receives log records from the core.
///
/// Implement this on the host side and install it with [`set_logger`]
/// once, before constructing the vault.
///
/// ## Swift
///
/// ```swift
/// final class OsLogBridge: Logger {
///     func log(level: LogLevel, message: String) {
///         os_log("%{public}@", message)
///     }
/// }
///
/// setLogger(logger: OsLogBridge())
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Send + Sync {
    /// Handles one log record.
    fn log(&self, level: LogLevel, message: String);
}

/// Forwards `log` crate records to the installed host logger.
struct HostForwarder;

impl log::Log for HostForwarder {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // Debug and trace records from dependencies are noise on a phone;
        // only forward them when they originate in this crate.
        let from_sesame = record
            .module_path()
            .is_some_and(|path| path.starts_with("sesame"));
        if record.level() >= log::Level::Debug && !from_sesame {
            return;
        }

        let message = format!("{}", record.args());
        if let Some(logger) = HOST_LOGGER.get() {
            logger.log(level_of(record.level()), message);
        } else {
            eprintln!("[sesame:{}] {message}", record.level());
        }
    }

    fn flush(&self) {}
}

const fn level_of(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static HOST_LOGGER: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs the host logger. Call once at startup; later calls are ignored.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if HOST_LOGGER.set(logger).is_err() {
        log::warn!("logger already set; ignoring");
        return;
    }

    static FORWARDER: HostForwarder = HostForwarder;
    if log::set_logger(&FORWARDER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
