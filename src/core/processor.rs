//! Processor contract
//!
//! A processor receives a batch of messages and a continuation (`Next`)
//! that runs the rest of its channel. It decides what to forward, when,
//! and in which shape:
//!
//! - call `next.call(messages)` right away to pass the batch on,
//! - forward a different batch (filtered, merged, rewritten),
//! - keep a clone of `next` and release the batch later,
//! - or never call it at all, which drops the batch.
//!
//! Calling `next` more than once is allowed; every call runs the remaining
//! stages independently.

use super::error::{LoggerError, Result};
use super::event_bus::{EventBus, LoggerEvent, Subscription};
use super::failure::{DispatchFailure, FailureReporter};
use super::log_context::LogContext;
use super::log_level::Level;
use super::log_message::{Arg, Message};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// One stage of a channel
///
/// # Example
///
/// ```
/// use logchain::core::{Message, Next, Processor, Result};
///
/// struct Uppercase;
///
/// impl Processor for Uppercase {
///     fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
///         for message in &mut messages {
///             for arg in &mut message.args {
///                 if let Some(s) = arg.as_str() {
///                     *arg = s.to_uppercase().into();
///                 }
///             }
///         }
///         next.call(messages)
///     }
/// }
/// ```
pub trait Processor: Send + Sync + 'static {
    fn process(&self, messages: Vec<Message>, next: &Next) -> Result<()>;

    /// Called once, in channel order, while the owning logger builds the
    /// channel. Stateful processors subscribe to control events here.
    fn bind(&mut self, binding: &ChannelBinding) -> Result<()> {
        let _ = binding;
        Ok(())
    }

    fn name(&self) -> &str {
        "processor"
    }
}

impl<F> Processor for F
where
    F: Fn(Vec<Message>, &Next) -> Result<()> + Send + Sync + 'static,
{
    fn process(&self, messages: Vec<Message>, next: &Next) -> Result<()> {
        self(messages, next)
    }

    fn name(&self) -> &str {
        "fn"
    }
}

/// Anything that accepts a leveled call: another logger, a third-party sink
pub trait Dispatch: Send + Sync {
    fn dispatch(
        &self,
        level: Level,
        args: Vec<Arg>,
        context: Option<Arc<LogContext>>,
    ) -> Result<()>;
}

type NextFn = dyn Fn(Vec<Message>) -> Result<()> + Send + Sync;

/// Continuation that runs the remaining stages of a channel.
///
/// Cheap to clone; processors that defer their output keep a clone and
/// call it later.
#[derive(Clone)]
pub struct Next {
    inner: Arc<NextFn>,
    channel: usize,
    failures: FailureReporter,
}

impl Next {
    pub(crate) fn new<F>(f: F, channel: usize, failures: FailureReporter) -> Self
    where
        F: Fn(Vec<Message>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            channel,
            failures,
        }
    }

    /// End of the chain: accepts and discards every batch
    pub(crate) fn terminal(channel: usize, failures: FailureReporter) -> Self {
        Self::new(|_| Ok(()), channel, failures)
    }

    /// Wrap a closure as a continuation, mostly useful for driving a
    /// processor outside a logger in tests
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Vec<Message>) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(f, 0, FailureReporter::default())
    }

    /// Run the remaining stages with `messages`
    #[inline]
    pub fn call(&self, messages: Vec<Message>) -> Result<()> {
        (self.inner)(messages)
    }

    /// Run the remaining stages outside of any logging call.
    ///
    /// Used by timers and event listeners: errors and panics go to the
    /// owning logger's failure surface because there is no caller to
    /// return them to.
    pub fn call_detached(&self, messages: Vec<Message>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.call(messages)));
        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(payload) => LoggerError::from_panic(payload),
        };
        self.failures
            .report(DispatchFailure::channel(self.channel, error));
    }

    pub fn channel(&self) -> usize {
        self.channel
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").field("channel", &self.channel).finish()
    }
}

/// What a processor sees of its logger while the channel is being built
pub struct ChannelBinding {
    channel: usize,
    bus: EventBus,
    failures: FailureReporter,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl ChannelBinding {
    pub(crate) fn new(channel: usize, bus: EventBus, failures: FailureReporter) -> Self {
        Self {
            channel,
            bus,
            failures,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Index the channel will have in its logger
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Listen for control events published by the owning logger
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LoggerEvent) + Send + Sync + 'static,
    {
        let subscription = self.bus.subscribe(listener);
        self.subscriptions.lock().push(subscription.clone());
        subscription
    }

    /// Report a failure that has no caller to return to
    pub fn report(&self, error: LoggerError) {
        self.failures
            .report(DispatchFailure::channel(self.channel, error));
    }

    pub fn failures(&self) -> &FailureReporter {
        &self.failures
    }

    /// Undo every subscription made through this binding
    pub(crate) fn rollback(&self) {
        for subscription in self.subscriptions.lock().drain(..) {
            subscription.unsubscribe();
        }
    }
}

/// A channel stage before it is bound to a logger.
///
/// Resolved once at channel construction into a uniform processor, so the
/// dispatch path never inspects what kind of stage it is running.
pub enum Stage {
    Processor(Box<dyn Processor>),
    Dispatcher(Arc<dyn Dispatch>),
}

impl Stage {
    pub fn new<P: Processor>(processor: P) -> Self {
        Stage::Processor(Box::new(processor))
    }

    /// Build a stage from a closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Vec<Message>, &Next) -> Result<()> + Send + Sync + 'static,
    {
        Stage::Processor(Box::new(f))
    }

    /// Forward every message to `dispatcher`, then continue the chain
    pub fn to<D: Dispatch + 'static>(dispatcher: Arc<D>) -> Self {
        Stage::Dispatcher(dispatcher)
    }

    pub(crate) fn into_processor(self) -> Box<dyn Processor> {
        match self {
            Stage::Processor(processor) => processor,
            Stage::Dispatcher(dispatcher) => Box::new(DispatcherAdapter { dispatcher }),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Processor(p) => write!(f, "Stage::Processor({})", p.name()),
            Stage::Dispatcher(_) => write!(f, "Stage::Dispatcher"),
        }
    }
}

struct DispatcherAdapter {
    dispatcher: Arc<dyn Dispatch>,
}

impl Processor for DispatcherAdapter {
    fn process(&self, messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &messages {
            self.dispatcher
                .dispatch(message.level, message.args.clone(), message.context.clone())?;
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "dispatcher"
    }
}
