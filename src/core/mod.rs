//! Core logger types and traits

pub(crate) mod channel;
pub mod error;
pub mod event_bus;
pub mod failure;
pub mod log_context;
pub mod log_level;
pub mod log_message;
pub mod logger;
pub mod metrics;
pub mod processor;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use event_bus::{EventBus, Listener, LoggerEvent, Subscription};
pub use failure::{DispatchFailure, FailureCallback, FailureReporter};
pub use log_context::LogContext;
pub use log_level::Level;
pub use log_message::{Arg, Args, ErrorArg, Message};
pub use logger::{BoundLevel, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use processor::{ChannelBinding, Dispatch, Next, Processor, Stage};
pub use timestamp::TimestampFormat;
