//! Crash-reporter sink
//!
//! Hands every message to an error-reporting client: messages at `ERROR`
//! or above are captured as exceptions, everything else as plain messages.

use crate::core::{Arg, ErrorArg, Level, LogContext, Message, Next, Processor, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Client of an external error-reporting service
pub trait ErrorReporter: Send + Sync + 'static {
    fn capture_message(&self, message: &str, options: &CaptureOptions) -> Result<()>;

    fn capture_exception(&self, error: &ErrorArg, options: &CaptureOptions) -> Result<()>;
}

/// Metadata sent along with every capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Reporter severity: `trace`, `debug`, `info`, `warning`, `error` or `fatal`
    pub level: &'static str,
    pub context: Option<Arc<LogContext>>,
    /// Additional fields from the capture-options hook
    pub extra: Map<String, Value>,
}

/// Severity label understood by error-reporting services
pub fn reporter_level(level: Level) -> &'static str {
    match level.to_lowercase_str() {
        "warn" => "warning",
        label => label,
    }
}

/// Error captured for a message that carries no error argument
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ReportedMessage(pub String);

pub type FormatMessageFn = Arc<dyn Fn(&Message) -> String + Send + Sync>;
pub type CaptureOptionsFn = Arc<dyn Fn(&Message) -> Option<Map<String, Value>> + Send + Sync>;

pub fn send_to_reporter<R: ErrorReporter>(reporter: Arc<R>) -> SendToReporter<R> {
    SendToReporter {
        reporter,
        format_message: None,
        capture_options: None,
    }
}

pub struct SendToReporter<R> {
    reporter: Arc<R>,
    format_message: Option<FormatMessageFn>,
    capture_options: Option<CaptureOptionsFn>,
}

impl<R: ErrorReporter> SendToReporter<R> {
    /// Override how message text is produced (default: the first argument)
    #[must_use]
    pub fn with_format_message<F>(mut self, format: F) -> Self
    where
        F: Fn(&Message) -> String + Send + Sync + 'static,
    {
        self.format_message = Some(Arc::new(format));
        self
    }

    /// Add extra capture fields per message
    #[must_use]
    pub fn with_capture_options<F>(mut self, options: F) -> Self
    where
        F: Fn(&Message) -> Option<Map<String, Value>> + Send + Sync + 'static,
    {
        self.capture_options = Some(Arc::new(options));
        self
    }

    pub fn format_message(&self, message: &Message) -> String {
        match &self.format_message {
            Some(format) => format(message),
            None => message.args.first().map(Arg::to_string).unwrap_or_default(),
        }
    }

    pub fn capture_options(&self, message: &Message) -> CaptureOptions {
        let extra = self
            .capture_options
            .as_ref()
            .and_then(|options| options(message))
            .unwrap_or_default();
        CaptureOptions {
            level: reporter_level(message.level),
            context: message.context.clone(),
            extra,
        }
    }

    fn send(&self, message: &Message) -> Result<()> {
        let text = self.format_message(message);
        let options = self.capture_options(message);

        if message.level < Level::ERROR {
            return self.reporter.capture_message(&text, &options);
        }

        match message.args.first() {
            Some(Arg::Error(error)) => self.reporter.capture_exception(error, &options),
            _ => self
                .reporter
                .capture_exception(&ErrorArg::new(ReportedMessage(text)), &options),
        }
    }
}

impl<R: ErrorReporter> Processor for SendToReporter<R> {
    fn process(&self, messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &messages {
            self.send(message)?;
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "send_to_reporter"
    }
}
