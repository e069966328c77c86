//! Process-wide default logger
//!
//! Created on first access with a single console channel. Call
//! `default_logger().reset(..)` to tear the console channel down and
//! configure your own.

use crate::core::{Logger, Stage};
use crate::processors::{write_to_console, ConsoleOptions};
use once_cell::sync::Lazy;

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(|| {
    let logger = Logger::new();
    if let Err(e) = logger.add_channel(vec![Stage::new(write_to_console(
        ConsoleOptions::default(),
    ))]) {
        eprintln!("[LOGGER WARNING] Default console channel unavailable: {}", e);
    }
    logger
});

/// The shared default logger, printing every message to the console
///
/// ```
/// use logchain::default_logger;
///
/// default_logger().info("hello from the default logger");
/// ```
pub fn default_logger() -> &'static Logger {
    &DEFAULT_LOGGER
}
