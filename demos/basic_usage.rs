//! Basic logger usage example
//!
//! Demonstrates a console channel with level and time prefixes and the
//! level threshold.
//!
//! Run with: cargo run --example basic_usage

use logchain::prelude::*;
use logchain::info;

fn main() -> Result<()> {
    println!("=== logchain - Basic Usage Example ===\n");

    let logger = Logger::new();
    logger.add_channel(vec![
        Stage::new(prepend_date_time(DateTimeOptions {
            colorized: true,
            no_date: true,
            ..Default::default()
        })),
        Stage::new(prepend_level()),
        Stage::new(write_to_console(ConsoleOptions { colorized: true })),
    ])?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Raising the threshold to INFO:");
    logger.set_level(Level::INFO);
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");

    println!("\n3. Multiple arguments and formatting:");
    logger.warn(args!["cache miss ratio", 0.42, serde_json::json!({"region": "eu"})]);
    info!(logger, "Served {} requests in {}ms", 128, 35);

    println!("\n4. Context:");
    logger.set_context(Some(LogContext::new().with_field("request_id", "r-17")));
    logger.add_channel(vec![
        Stage::new(stringify_json()),
        Stage::new(write_to_console(ConsoleOptions::default())),
    ])?;
    logger.info("Printed twice: once as text, once as JSON");

    logger.flush();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
