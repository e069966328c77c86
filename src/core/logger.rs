//! Main logger implementation

use super::{
    channel::Channel,
    error::Result,
    event_bus::{EventBus, LoggerEvent, Subscription},
    failure::{DispatchFailure, FailureCallback, FailureReporter},
    log_context::LogContext,
    log_level::Level,
    log_message::{Arg, Args, Message},
    metrics::LoggerMetrics,
    processor::{Dispatch, Stage},
};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

/// Routes leveled calls to independent channels.
///
/// Every method takes `&self`, so a logger can be shared behind an `Arc`
/// or a `static` and reconfigured while in use.
pub struct Logger {
    level: RwLock<Level>,
    context: RwLock<Option<Arc<LogContext>>>,
    channels: RwLock<Vec<Arc<Channel>>>,
    bus: EventBus,
    /// Metrics for observability (dispatched, gated, failures)
    metrics: Arc<LoggerMetrics>,
    failures: FailureReporter,
}

impl Logger {
    /// Create a logger that lets every level through and has no channels
    #[must_use]
    pub fn new() -> Self {
        Self::with_level(Level::ALL)
    }

    #[must_use]
    pub fn with_level(level: Level) -> Self {
        let metrics = Arc::new(LoggerMetrics::new());
        Self {
            level: RwLock::new(level),
            context: RwLock::new(None),
            channels: RwLock::new(Vec::new()),
            bus: EventBus::new(),
            failures: FailureReporter::new(Arc::clone(&metrics)),
            metrics,
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use logchain::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .level(Level::DEBUG)
    ///     .build()
    ///     .unwrap();
    /// assert!(!logger.is_trace_enabled());
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn level(&self) -> Level {
        *self.level.read()
    }

    pub fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    /// The context attached to messages logged without an explicit one
    pub fn context(&self) -> Option<Arc<LogContext>> {
        self.context.read().clone()
    }

    pub fn set_context(&self, context: Option<LogContext>) {
        *self.context.write() = context.map(Arc::new);
    }

    /// Share an existing context allocation with every future message
    pub fn set_shared_context(&self, context: Option<Arc<LogContext>>) {
        *self.context.write() = context;
    }

    /// Whether a message at `level` would reach the channels
    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        let threshold = *self.level.read();
        threshold != Level::OFF && level >= threshold
    }

    #[inline]
    pub fn is_trace_enabled(&self) -> bool {
        self.is_enabled(Level::TRACE)
    }

    #[inline]
    pub fn is_debug_enabled(&self) -> bool {
        self.is_enabled(Level::DEBUG)
    }

    #[inline]
    pub fn is_info_enabled(&self) -> bool {
        self.is_enabled(Level::INFO)
    }

    #[inline]
    pub fn is_warn_enabled(&self) -> bool {
        self.is_enabled(Level::WARN)
    }

    #[inline]
    pub fn is_error_enabled(&self) -> bool {
        self.is_enabled(Level::ERROR)
    }

    #[inline]
    pub fn is_fatal_enabled(&self) -> bool {
        self.is_enabled(Level::FATAL)
    }

    /// Log a finer-grained informational message than `debug`
    #[inline]
    pub fn trace(&self, args: impl Into<Args>) {
        self.log_at(Level::TRACE, args);
    }

    /// Log a fine-grained message most useful to debug an application
    #[inline]
    pub fn debug(&self, args: impl Into<Args>) {
        self.log_at(Level::DEBUG, args);
    }

    /// Log the progress of the application at a coarse-grained level
    #[inline]
    pub fn info(&self, args: impl Into<Args>) {
        self.log_at(Level::INFO, args);
    }

    /// Log a potentially harmful situation
    #[inline]
    pub fn warn(&self, args: impl Into<Args>) {
        self.log_at(Level::WARN, args);
    }

    /// Log an error that still allows the application to continue
    #[inline]
    pub fn error(&self, args: impl Into<Args>) {
        self.log_at(Level::ERROR, args);
    }

    /// Log a severe error that will presumably abort the application
    #[inline]
    pub fn fatal(&self, args: impl Into<Args>) {
        self.log_at(Level::FATAL, args);
    }

    /// Alias for `info`
    #[inline]
    pub fn log(&self, args: impl Into<Args>) {
        self.info(args);
    }

    /// Log at an arbitrary level with the logger's current context
    pub fn log_at(&self, level: Level, args: impl Into<Args>) {
        if !self.is_enabled(level) {
            self.metrics.record_gated();
            return;
        }
        let context = self.context();
        self.fan_out(level, args.into().into_vec(), context);
    }

    /// Log with an explicit context instead of the logger's default
    pub fn log_with_context(&self, level: Level, args: impl Into<Args>, context: LogContext) {
        self.dispatch(level, args.into().into_vec(), Some(Arc::new(context)));
    }

    /// Gate, stamp and fan out one call.
    ///
    /// Each channel gets its own copy of the message (the context `Arc` is
    /// shared), so a stage mutating args in one channel is never seen by
    /// another. Failures are collected and reported once every channel has
    /// been invoked; this method never returns an error or panics because
    /// of a stage.
    pub fn dispatch(&self, level: Level, args: Vec<Arg>, context: Option<Arc<LogContext>>) {
        if !self.is_enabled(level) {
            self.metrics.record_gated();
            return;
        }
        self.fan_out(level, args, context);
    }

    fn fan_out(&self, level: Level, args: Vec<Arg>, context: Option<Arc<LogContext>>) {
        self.metrics.record_dispatched();

        // Snapshot so stages may reconfigure this logger without deadlocking
        let channels: Vec<Arc<Channel>> = self.channels.read().clone();
        if channels.is_empty() {
            return;
        }

        let timestamp = Utc::now().timestamp_millis();
        let mut failures = Vec::new();

        for (idx, channel) in channels.iter().enumerate() {
            let message = Message::with_timestamp(timestamp, level, args.clone(), context.clone());
            if let Err(e) = channel.dispatch(message) {
                failures.push(DispatchFailure::channel(idx, e));
            }
        }

        for failure in failures {
            self.failures.report(failure);
        }
    }

    /// Build a channel from `stages` and append it.
    ///
    /// Stages are bound in order (a stage may subscribe to control events
    /// while binding). Binding errors are returned here and the channel is
    /// not added. An empty stage list adds nothing.
    pub fn add_channel<I>(&self, stages: I) -> Result<&Self>
    where
        I: IntoIterator<Item = Stage>,
    {
        let stages: Vec<Stage> = stages.into_iter().collect();
        if stages.is_empty() {
            return Ok(self);
        }

        // Held across the build so concurrent calls get distinct indices
        let mut channels = self.channels.write();
        let channel = Channel::build(channels.len(), stages, &self.bus, &self.failures)?;
        channels.push(Arc::new(channel));
        Ok(self)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Number of stages in each channel, in dispatch order
    pub fn channel_sizes(&self) -> Vec<usize> {
        self.channels.read().iter().map(|c| c.len()).collect()
    }

    /// Drop every channel and control-event subscriber.
    ///
    /// A `Reset` event is published first so processors holding buffered
    /// messages release them before their channel is discarded. `level` and
    /// `context` replace the current values when given and are kept
    /// otherwise.
    pub fn reset(&self, level: Option<Level>, context: Option<LogContext>) -> &Self {
        self.publish(LoggerEvent::Reset);

        self.bus.clear();
        // Dropped outside the lock: a dropped batcher may still deliver
        let discarded = std::mem::take(&mut *self.channels.write());
        drop(discarded);

        if let Some(level) = level {
            self.set_level(level);
        }
        if let Some(context) = context {
            self.set_context(Some(context));
        }
        self
    }

    /// Ask subscribed processors to deliver anything they are holding
    pub fn flush(&self) {
        self.publish(LoggerEvent::Flush);
    }

    /// Listen for control events published by this logger
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LoggerEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Deliver a control event to every subscriber
    pub fn publish(&self, event: LoggerEvent) {
        self.metrics.record_event();
        for error in self.bus.publish(event) {
            self.failures.report(DispatchFailure::listener(error));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.len()
    }

    /// Replace the failure callback; `None` restores the stderr default
    pub fn on_failure(&self, callback: Option<FailureCallback>) {
        self.failures.set_handler(callback);
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use logchain::Logger;
    ///
    /// let logger = Logger::new();
    /// logger.info("hello");
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.dispatched(), 1);
    /// assert_eq!(metrics.failures(), 0);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// A handle that logs at a fixed level and keeps this logger alive.
    ///
    /// Stands in for detachable leveled methods: the handle can be cloned,
    /// moved to another thread and called without the logger in scope.
    pub fn bound(self: &Arc<Self>, level: Level) -> BoundLevel {
        BoundLevel {
            logger: Arc::clone(self),
            level,
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for Logger {
    fn dispatch(
        &self,
        level: Level,
        args: Vec<Arg>,
        context: Option<Arc<LogContext>>,
    ) -> Result<()> {
        Logger::dispatch(self, level, args, context);
        Ok(())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Give buffering processors a last chance to deliver
        if !self.bus.is_empty() {
            self.flush();
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("context", &self.context())
            .field("channels", &self.channel_sizes())
            .field("subscribers", &self.bus.len())
            .finish()
    }
}

/// Logs at a fixed level through a shared logger
#[derive(Clone, Debug)]
pub struct BoundLevel {
    logger: Arc<Logger>,
    level: Level,
}

impl BoundLevel {
    pub fn log(&self, args: impl Into<Args>) {
        self.logger.log_at(self.level, args);
    }

    pub fn is_enabled(&self) -> bool {
        self.logger.is_enabled(self.level)
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use logchain::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .level(Level::INFO)
///     .context(LogContext::new().with_field("service", "api"))
///     .channel(vec![
///         Stage::new(prepend_level()),
///         Stage::new(write_to_console(ConsoleOptions::default())),
///     ])
///     .on_failure(Arc::new(|failure: &DispatchFailure| {
///         eprintln!("logging failed: {}", failure)
///     }))
///     .build()
///     .unwrap();
///
/// assert_eq!(logger.channel_count(), 1);
/// ```
pub struct LoggerBuilder {
    level: Level,
    context: Option<LogContext>,
    channels: Vec<Vec<Stage>>,
    on_failure: Option<FailureCallback>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            level: Level::ALL,
            context: None,
            channels: Vec::new(),
            on_failure: None,
        }
    }

    /// Set the minimum level of dispatched messages
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the default context
    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: LogContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a channel; channels are built in the order they were added
    #[must_use = "builder methods return a new value"]
    pub fn channel<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = Stage>,
    {
        self.channels.push(stages.into_iter().collect());
        self
    }

    /// Set a callback for failures that happen after a call returned
    #[must_use = "builder methods return a new value"]
    pub fn on_failure(mut self, callback: FailureCallback) -> Self {
        self.on_failure = Some(callback);
        self
    }

    /// Build the Logger, surfacing the first channel configuration error
    pub fn build(self) -> Result<Logger> {
        let logger = Logger::with_level(self.level);
        logger.set_context(self.context);
        logger.on_failure(self.on_failure);

        for stages in self.channels {
            logger.add_channel(stages)?;
        }

        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
