//! Logging utilities
//!
//! Thin wrappers over the `log` facade so every engine record carries the
//! same target. The host decides where records go.

#![allow(unused)]

const TARGET: &str = "gridline::battle";

/// Log an info message
#[inline]
pub fn info(msg: &str) {
    log::info!(target: TARGET, "{}", msg);
}

/// Log a warning message
#[inline]
pub fn warn(msg: &str) {
    log::warn!(target: TARGET, "{}", msg);
}

/// Log a debug message with a label
#[inline]
pub fn debug(label: &str, msg: &str) {
    log::debug!(target: TARGET, "[{}] {}", label, msg);
}

/// Log an action being performed
#[inline]
pub fn action(name: &str, details: &str) {
    log::trace!(target: TARGET, "{} {}", name, details);
}
