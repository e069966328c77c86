//! Batching example
//!
//! Messages are held until 5 have accumulated or 200ms have passed since
//! the first one, then written together.
//!
//! Run with: cargo run --example batching

use logchain::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== logchain - Batching Example ===\n");

    let logger = Logger::new();
    logger.add_channel(vec![
        Stage::new(batch_messages(BatchOptions {
            timeout: Some(Duration::from_millis(200)),
            limit: Some(5),
        })?),
        Stage::from_fn(|messages, next| {
            println!("-- batch of {} --", messages.len());
            next.call(messages)
        }),
        Stage::new(prepend_level()),
        Stage::new(write_to_console(ConsoleOptions::default())),
    ])?;

    println!("1. Reaching the limit:");
    for i in 0..5 {
        logger.info(args!["message", i]);
    }

    println!("\n2. Waiting for the timeout:");
    logger.info("lonely message");
    thread::sleep(Duration::from_millis(300));

    println!("\n3. Flushing explicitly:");
    logger.warn("flushed before the timeout");
    logger.flush();

    println!("\n4. Reset delivers what is still buffered:");
    logger.error("buffered when reset");
    logger.reset(None, None);
    logger.error("no channels left, dropped");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
