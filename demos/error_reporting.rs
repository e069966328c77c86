//! Error reporting example
//!
//! Sends messages to a crash-reporting client and shows how channel
//! failures are isolated and surfaced.
//!
//! Run with: cargo run --example error_reporting

use logchain::prelude::*;
use std::sync::Arc;

/// Stand-in for an error-reporting service client
struct PrintingReporter;

impl ErrorReporter for PrintingReporter {
    fn capture_message(&self, message: &str, options: &CaptureOptions) -> Result<()> {
        println!("[reporter] message ({}): {}", options.level, message);
        Ok(())
    }

    fn capture_exception(&self, error: &ErrorArg, options: &CaptureOptions) -> Result<()> {
        println!("[reporter] exception ({}): {}", options.level, error.stack_trace());
        if let Some(context) = &options.context {
            println!("[reporter]   context: {}", context);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("payment declined")]
struct PaymentDeclined(#[source] std::io::Error);

fn main() -> Result<()> {
    println!("=== logchain - Error Reporting Example ===\n");

    let logger = Logger::builder()
        .level(Level::WARN)
        .context(LogContext::new().with_field("service", "checkout"))
        .channel(vec![
            Stage::new(level_cutoff(Level::ERROR)),
            Stage::new(send_to_reporter(Arc::new(PrintingReporter))),
        ])
        .channel(vec![Stage::from_fn(|_messages, _next| {
            Err(LoggerError::sink("flaky", "connection refused"))
        })])
        .channel(vec![
            Stage::new(prepend_level()),
            Stage::new(write_to_console(ConsoleOptions::default())),
        ])
        .on_failure(Arc::new(|failure: &DispatchFailure| {
            println!("[failure] {}", failure);
        }))
        .build()?;

    println!("1. A warning reaches the console, not the reporter:");
    logger.warn("inventory running low");

    println!("\n2. An error reaches both:");
    logger.error(Arg::error(PaymentDeclined(std::io::Error::other(
        "gateway timeout",
    ))));

    println!("\n3. Metrics:");
    let metrics = logger.metrics();
    println!("   dispatched: {}", metrics.dispatched());
    println!("   failures:   {}", metrics.failures());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
