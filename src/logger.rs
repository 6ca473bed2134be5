//! Caller-facing progress messages.
//!
//! These are the human-readable lines an import prints while it installs
//! packages. Diagnostics go through the `log` facade instead.

use log::debug;

/// Sink for progress messages.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Prints each message to stdout with a fixed prefix.
#[derive(Debug, Clone)]
pub struct StdoutLogger {
    prefix: String,
}

impl StdoutLogger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn format(&self, message: &str) -> String {
        format!("{} {}", self.prefix, message)
    }
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new("[NPXI]")
    }
}

impl Logger for StdoutLogger {
    fn log(&self, message: &str) {
        println!("{}", self.format(message));
    }
}

/// Prints nothing. Messages are still visible as debug diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLogger;

impl Logger for SilentLogger {
    fn log(&self, message: &str) {
        debug!("{}", message);
    }
}
