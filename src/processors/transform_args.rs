//! Rewrites message arguments

use crate::core::{Arg, Message, Next, Processor, Result};
use serde_json::Value;

/// Replace each message's arguments with what `transform` returns for it
///
/// ```
/// use logchain::prelude::*;
///
/// let redact = transform_args(|message: &Message| {
///     message
///         .args
///         .iter()
///         .map(|arg| match arg.as_str() {
///             Some(s) if s.contains("password") => Arg::from("<redacted>"),
///             _ => arg.clone(),
///         })
///         .collect()
/// });
/// ```
pub fn transform_args<F>(transform: F) -> TransformArgs<F>
where
    F: Fn(&Message) -> Vec<Arg> + Send + Sync + 'static,
{
    TransformArgs { transform }
}

pub struct TransformArgs<F> {
    transform: F,
}

impl<F> Processor for TransformArgs<F>
where
    F: Fn(&Message) -> Vec<Arg> + Send + Sync + 'static,
{
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            message.args = (self.transform)(message);
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "transform_args"
    }
}

/// Replace every argument with a string showing its structure
pub fn inspect_args() -> InspectArgs {
    InspectArgs
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InspectArgs;

/// Developer-facing rendering of one argument.
///
/// Strings are quoted, objects and arrays are pretty-printed and errors
/// show their cause chain.
pub fn inspect(arg: &Arg) -> String {
    match arg {
        Arg::Value(value @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Arg::Value(value) => value.to_string(),
        Arg::Error(error) => error.stack_trace(),
    }
}

impl Processor for InspectArgs {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            for arg in &mut message.args {
                *arg = Arg::from(inspect(arg));
            }
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "inspect_args"
    }
}
