//! Integration tests for logchain
//!
//! These tests verify:
//! - Level gating and channel fan-out
//! - Channel failure isolation
//! - Stage ordering within a channel
//! - Batching by limit, timeout and control events
//! - Reset and flush behavior
//! - Console and reporter sinks
//! - Context propagation and forwarding between loggers

use logchain::prelude::*;
use logchain::processors::{ConsoleStream, ReportedMessage};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type Batches = Arc<Mutex<Vec<Vec<Message>>>>;

/// Stage that records every batch it receives and forwards it
fn recorder() -> (Stage, Batches) {
    let batches: Batches = Arc::new(Mutex::new(Vec::new()));
    let batches_clone = Arc::clone(&batches);
    let stage = Stage::from_fn(move |messages: Vec<Message>, next: &Next| {
        batches_clone.lock().push(messages.clone());
        next.call(messages)
    });
    (stage, batches)
}

fn total(batches: &Batches) -> usize {
    batches.lock().iter().map(Vec::len).sum()
}

fn collect_failures(logger: &Logger) -> Arc<Mutex<Vec<String>>> {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let failures_clone = Arc::clone(&failures);
    logger.on_failure(Some(Arc::new(move |failure: &DispatchFailure| {
        failures_clone.lock().push(failure.to_string());
    })));
    failures
}

#[derive(Default)]
struct CaptureConsole {
    lines: Mutex<Vec<(ConsoleStream, String)>>,
    flushes: Mutex<usize>,
}

impl ConsoleWriter for CaptureConsole {
    fn write(&self, stream: ConsoleStream, line: &str) -> logchain::Result<()> {
        self.lines.lock().push((stream, line.to_string()));
        Ok(())
    }

    fn flush(&self) -> logchain::Result<()> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}

#[test]
fn test_level_gate() {
    let logger = Logger::with_level(Level::WARN);
    let (stage, batches) = recorder();
    logger.add_channel(vec![stage]).unwrap();

    logger.trace("t");
    logger.debug("d");
    logger.info("i");
    assert_eq!(total(&batches), 0);

    logger.warn("w");
    logger.error("e");
    logger.fatal("f");

    let levels: Vec<Level> = batches.lock().iter().map(|b| b[0].level).collect();
    assert_eq!(levels, vec![Level::WARN, Level::ERROR, Level::FATAL]);
    assert!(batches.lock().iter().all(|b| b.len() == 1));
}

#[test]
fn test_fan_out_independence() {
    let logger = Logger::new();
    let failures = collect_failures(&logger);

    logger
        .add_channel(vec![Stage::from_fn(|_messages, _next| {
            Err(LoggerError::sink("broken", "unreachable host"))
        })])
        .unwrap();
    let (stage, batches) = recorder();
    logger.add_channel(vec![stage]).unwrap();

    logger.info(args!["payload", 1]);

    let batches = batches.lock();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].args, vec![Arg::from("payload"), Arg::from(1)]);
    assert_eq!(failures.lock().len(), 1);
    assert!(failures.lock()[0].starts_with("Channel #0 failed"));
}

#[test]
fn test_panicking_channel_is_isolated() {
    let logger = Logger::new();
    let failures = collect_failures(&logger);

    logger
        .add_channel(vec![Stage::from_fn(|_messages, _next| panic!("sink exploded"))])
        .unwrap();
    let (stage, batches) = recorder();
    logger.add_channel(vec![stage]).unwrap();

    logger.error("still delivered");
    logger.error("and again");

    assert_eq!(total(&batches), 2);
    assert_eq!(failures.lock().len(), 2);
    assert!(failures.lock()[0].contains("sink exploded"));
}

#[test]
fn test_chain_order() {
    let logger = Logger::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);

    logger
        .add_channel(vec![
            Stage::from_fn(move |mut messages: Vec<Message>, next: &Next| {
                first.lock().push("s1 before".to_string());
                messages[0].args.push(Arg::from("from s1"));
                next.call(messages)?;
                first.lock().push("s1 after".to_string());
                Ok(())
            }),
            Stage::from_fn(move |messages: Vec<Message>, next: &Next| {
                let rendered: Vec<String> = messages[0].args.iter().map(ToString::to_string).collect();
                second.lock().push(format!("s2 saw {}", rendered.join(",")));
                next.call(messages)
            }),
        ])
        .unwrap();

    logger.info("aaa");

    assert_eq!(
        *order.lock(),
        vec!["s1 before", "s2 saw aaa,from s1", "s1 after"]
    );
}

#[test]
fn test_batching_limit() {
    let logger = Logger::new();
    let (stage, batches) = recorder();
    logger
        .add_channel(vec![
            Stage::new(batch_messages(BatchOptions { timeout: None, limit: Some(2) }).unwrap()),
            stage,
        ])
        .unwrap();

    logger.info("aaa");
    assert!(batches.lock().is_empty());

    logger.info("bbb");
    let batches = batches.lock();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[0][0].args, vec![Arg::from("aaa")]);
    assert_eq!(batches[0][1].args, vec![Arg::from("bbb")]);
}

#[test]
fn test_batching_timeout() {
    let logger = Logger::new();
    let (stage, batches) = recorder();
    logger
        .add_channel(vec![
            Stage::new(
                batch_messages(BatchOptions {
                    timeout: Some(Duration::from_millis(10)),
                    limit: None,
                })
                .unwrap(),
            ),
            stage,
        ])
        .unwrap();

    logger.info(args!["aaa", json!({"k": 1})]);
    assert!(batches.lock().is_empty());

    thread::sleep(Duration::from_millis(200));

    let batches = batches.lock();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].args, vec![Arg::from("aaa"), Arg::from(json!({"k": 1}))]);
}

#[test]
fn test_flush_releases_pending_batch_once() {
    let logger = Logger::new();
    let (stage, batches) = recorder();
    logger
        .add_channel(vec![
            Stage::new(
                batch_messages(BatchOptions {
                    timeout: Some(Duration::from_secs(60)),
                    limit: Some(100),
                })
                .unwrap(),
            ),
            stage,
        ])
        .unwrap();

    logger.info("aaa");
    logger.info("bbb");
    assert!(batches.lock().is_empty());

    logger.flush();
    assert_eq!(batches.lock().len(), 1);
    assert_eq!(batches.lock()[0].len(), 2);

    logger.flush();
    assert_eq!(batches.lock().len(), 1);
}

#[test]
fn test_reset_clears_channels() {
    let logger = Logger::new();
    let (stage, batches) = recorder();
    logger.add_channel(vec![stage]).unwrap();

    logger.reset(None, None);
    logger.info("aaa");

    assert!(batches.lock().is_empty());
    assert_eq!(logger.channel_count(), 0);
}

#[test]
fn test_reset_releases_buffered_messages() {
    let logger = Logger::new();
    let (stage, batches) = recorder();
    logger
        .add_channel(vec![
            Stage::new(batch_messages(BatchOptions { timeout: None, limit: Some(10) }).unwrap()),
            stage,
        ])
        .unwrap();

    logger.info("buffered");
    logger.reset(Some(Level::ERROR), None);

    assert_eq!(total(&batches), 1);
    assert_eq!(logger.level(), Level::ERROR);
    assert_eq!(logger.subscriber_count(), 0);
}

#[test]
fn test_dropping_logger_flushes_batches() {
    let (stage, batches) = recorder();
    {
        let logger = Logger::new();
        logger
            .add_channel(vec![
                Stage::new(batch_messages(BatchOptions::default()).unwrap()),
                stage,
            ])
            .unwrap();
        logger.info("last words");
    }
    assert_eq!(total(&batches), 1);
}

#[test]
fn test_console_sink_mapping() {
    let console = Arc::new(CaptureConsole::default());
    let logger = Logger::new();
    logger
        .add_channel(vec![Stage::new(write_to_console_with(
            Arc::clone(&console),
            ConsoleOptions::default(),
        ))])
        .unwrap();

    for level in [
        Level::TRACE,
        Level::DEBUG,
        Level::INFO,
        Level::WARN,
        Level::ERROR,
        Level::FATAL,
    ] {
        logger.log_at(level, "aaa");
    }

    let streams: Vec<ConsoleStream> = console.lines.lock().iter().map(|(s, _)| *s).collect();
    assert_eq!(
        streams,
        vec![
            ConsoleStream::Trace,
            ConsoleStream::Debug,
            ConsoleStream::Info,
            ConsoleStream::Warn,
            ConsoleStream::Error,
            ConsoleStream::Error,
        ]
    );
    assert_eq!(streams.iter().filter(|s| **s == ConsoleStream::Error).count(), 2);

    logger.flush();
    assert_eq!(*console.flushes.lock(), 1);
}

#[test]
fn test_formatting_chain_into_console() {
    let console = Arc::new(CaptureConsole::default());
    let logger = Logger::new();
    logger
        .add_channel(vec![
            Stage::new(level_cutoff(Level::INFO)),
            Stage::new(prepend_args("[api]")),
            Stage::new(prepend_level()),
            Stage::new(write_to_console_with(Arc::clone(&console), ConsoleOptions::default())),
        ])
        .unwrap();

    logger.debug("dropped by cutoff");
    logger.info("ready");
    logger.warn(args!["slow", 250]);

    let lines: Vec<String> = console.lines.lock().iter().map(|(_, l)| l.clone()).collect();
    assert_eq!(lines, vec!["INFO  [api] ready", "WARN  [api] slow 250"]);
}

#[test]
fn test_context_propagation() {
    let logger = Logger::new();
    logger.set_context(Some(LogContext::new().with_field("a", 1)));
    let (first, first_batches) = recorder();
    let (second, second_batches) = recorder();
    logger.add_channel(vec![first]).unwrap();
    logger.add_channel(vec![second]).unwrap();

    logger.info("aaa");

    for batches in [&first_batches, &second_batches] {
        let batches = batches.lock();
        let context = batches[0][0].context.as_ref().unwrap();
        assert_eq!(context.get("a"), Some(&json!(1)));
    }
}

#[test]
fn test_context_mutation_stays_in_channel() {
    let logger = Logger::new();
    logger.set_context(Some(LogContext::new().with_field("a", 1)));
    logger
        .add_channel(vec![Stage::from_fn(|mut messages: Vec<Message>, next: &Next| {
            messages[0].context_mut().add_field("b", 2);
            next.call(messages)
        })])
        .unwrap();
    let (stage, batches) = recorder();
    logger.add_channel(vec![stage]).unwrap();

    logger.info("aaa");

    let batches = batches.lock();
    assert_eq!(batches[0][0].context.as_ref().unwrap().get("b"), None);
    assert_eq!(logger.context().unwrap().get("b"), None);
}

#[test]
fn test_dispatcher_forwarding() {
    let audit = Arc::new(Logger::with_level(Level::ERROR));
    let (stage, batches) = recorder();
    audit.add_channel(vec![stage]).unwrap();

    let app = Logger::new();
    app.set_context(Some(LogContext::new().with_field("service", "billing")));
    app.add_channel(vec![Stage::to(Arc::clone(&audit))]).unwrap();

    app.info("ignored by audit");
    app.error("charge failed");

    let batches = batches.lock();
    assert_eq!(batches.len(), 1);
    let message = &batches[0][0];
    assert_eq!(message.level, Level::ERROR);
    assert_eq!(message.args, vec![Arg::from("charge failed")]);
    assert_eq!(
        message.context.as_ref().unwrap().get("service"),
        Some(&json!("billing"))
    );
}

#[test]
fn test_reporter_sink() {
    #[derive(Default)]
    struct Reporter {
        captured: Mutex<Vec<(&'static str, String, &'static str)>>,
    }

    impl ErrorReporter for Reporter {
        fn capture_message(&self, message: &str, options: &CaptureOptions) -> logchain::Result<()> {
            self.captured.lock().push(("message", message.to_string(), options.level));
            Ok(())
        }

        fn capture_exception(&self, error: &ErrorArg, options: &CaptureOptions) -> logchain::Result<()> {
            self.captured.lock().push(("exception", error.to_string(), options.level));
            Ok(())
        }
    }

    let reporter = Arc::new(Reporter::default());
    let logger = Logger::new();
    logger
        .add_channel(vec![Stage::new(send_to_reporter(Arc::clone(&reporter)))])
        .unwrap();

    logger.info("checkout started");
    logger.warn("retrying");
    logger.error(Arg::error(ReportedMessage("card declined".to_string())));

    assert_eq!(
        *reporter.captured.lock(),
        vec![
            ("message", "checkout started".to_string(), "info"),
            ("message", "retrying".to_string(), "warning"),
            ("exception", "card declined".to_string(), "error"),
        ]
    );
}

#[test]
fn test_stringify_json_channel() {
    let console = Arc::new(CaptureConsole::default());
    let logger = Logger::new();
    logger.set_context(Some(LogContext::new().with_field("host", "web-1")));
    logger
        .add_channel(vec![
            Stage::new(stringify_json()),
            Stage::new(write_to_console_with(Arc::clone(&console), ConsoleOptions::default())),
        ])
        .unwrap();

    logger.warn(args!["disk at ", 91, "%", json!({"mount": "/var"})]);

    let lines = console.lines.lock();
    let parsed: serde_json::Value = serde_json::from_str(&lines[0].1).unwrap();
    assert_eq!(parsed["level"], json!("warn"));
    assert_eq!(parsed["message"], json!("disk at 91%"));
    assert_eq!(parsed["mount"], json!("/var"));
    assert_eq!(parsed["host"], json!("web-1"));
    assert!(parsed["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_bound_level_handle() {
    let logger = Arc::new(Logger::with_level(Level::INFO));
    let (stage, batches) = recorder();
    logger.add_channel(vec![stage]).unwrap();

    let debug = logger.bound(Level::DEBUG);
    let warn = logger.bound(Level::WARN);
    assert!(!debug.is_enabled());

    debug.log("hidden");
    warn.log("shown");

    let batches = batches.lock();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].level, Level::WARN);
}

#[test]
fn test_concurrent_logging() {
    let logger = Arc::new(Logger::new());
    let (stage, batches) = recorder();
    logger
        .add_channel(vec![
            Stage::new(batch_messages(BatchOptions { timeout: None, limit: Some(7) }).unwrap()),
            stage,
        ])
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..50 {
                    logger.info(args!["thread", t, "message", i]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush();

    assert_eq!(total(&batches), 200);
    assert_eq!(logger.metrics().dispatched(), 200);
}

#[test]
fn test_invalid_batch_options_rejected_at_build() {
    let result = batch_messages(BatchOptions {
        timeout: Some(Duration::ZERO),
        limit: None,
    });
    assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
}

#[test]
fn test_batch_options_from_json() {
    let options: BatchOptions = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
    assert_eq!(options.limit, Some(5));
    assert_eq!(options.timeout, Some(Duration::from_millis(100)));
}
