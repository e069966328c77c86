//! # logchain
//!
//! An embeddable logging facade. A [`Logger`] gates leveled calls against
//! a threshold and fans each message out to independent channels. A
//! channel is an ordered chain of processors; every processor receives a
//! batch of messages and a continuation, and decides what to forward and
//! when.
//!
//! ## Features
//!
//! - **Composable channels**: filters, formatters, batchers and sinks are
//!   all processors
//! - **Failure isolation**: a failing or panicking channel never affects
//!   its siblings or the caller
//! - **Control events**: `flush` and `reset` reach stateful processors
//!   such as the batcher
//! - **Thread safe**: loggers are `Send + Sync` and reconfigurable in use
//!
//! ## Example
//!
//! ```
//! use logchain::prelude::*;
//!
//! let logger = Logger::builder()
//!     .level(Level::INFO)
//!     .channel(vec![
//!         Stage::new(prepend_level()),
//!         Stage::new(write_to_console(ConsoleOptions::default())),
//!     ])
//!     .build()?;
//!
//! logger.info("service started");
//! logger.debug("not dispatched");
//! # Ok::<(), logchain::LoggerError>(())
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod processors;

pub mod prelude {
    pub use crate::args;
    pub use crate::core::{
        Arg, Args, BoundLevel, ChannelBinding, Dispatch, DispatchFailure, ErrorArg, Level,
        LogContext, Logger, LoggerBuilder, LoggerError, LoggerEvent, LoggerMetrics, Message,
        Next, Processor, Result, Stage, Subscription, TimestampFormat,
    };
    pub use crate::global::default_logger;
    pub use crate::processors::{
        batch_messages, inspect_args, level_cutoff, prepend_args, prepend_date_time,
        prepend_level, prepend_timestamp, send_to_reporter, stringify_json, structurize_args,
        transform_args, write_to_console, write_to_console_with, BatchOptions, CaptureOptions,
        ConsoleOptions, ConsoleStream, ConsoleWriter, DateTimeOptions, ErrorReporter,
        StructurizeOptions,
    };
}

pub use core::{
    Arg, Args, BoundLevel, ChannelBinding, Dispatch, DispatchFailure, ErrorArg, EventBus,
    FailureCallback, Level, LogContext, Logger, LoggerBuilder, LoggerError, LoggerEvent,
    LoggerMetrics, Message, Next, Processor, Result, Stage, Subscription, TimestampFormat,
};
pub use global::default_logger;
