//! Host event and log callbacks.
//!
//! Embedders that do not consume `tracing` output can register plain
//! callbacks here. [`emit_log`] always forwards to `tracing` as well.

use parking_lot::Mutex;
use std::sync::OnceLock;

/// Log level for host callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

type EventCallback = Box<dyn Fn(&str, &str) + Send + Sync + 'static>;
type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

fn event_callback() -> &'static Mutex<Option<EventCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<EventCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global event callback.
pub fn set_event_callback<F>(callback: F)
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    *event_callback().lock() = Some(Box::new(callback));
}

/// Remove the global event callback.
pub fn clear_event_callback() {
    *event_callback().lock() = None;
}

/// Emit an event to the registered callback.
pub fn emit_event(name: &str, data: &str) {
    if let Some(callback) = event_callback().lock().as_ref() {
        callback(name, data);
    }
}

/// Set the global log callback.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    *log_callback().lock() = Some(Box::new(callback));
}

/// Remove the global log callback.
pub fn clear_log_callback() {
    *log_callback().lock() = None;
}

/// Emit a log message to `tracing` and the registered callback.
pub fn emit_log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!(target: "vtframe::host", "{message}"),
        LogLevel::Info => tracing::info!(target: "vtframe::host", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "vtframe::host", "{message}"),
        LogLevel::Error => tracing::error!(target: "vtframe::host", "{message}"),
    }
    if let Some(callback) = log_callback().lock().as_ref() {
        callback(level, message);
    }
}
