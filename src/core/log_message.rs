//! Message record and argument values

use super::log_context::LogContext;
use super::log_level::Level;
use super::timestamp::datetime_from_millis;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// An error value logged as an argument.
///
/// Shared behind an `Arc` so that copying a message for every channel does
/// not require the error type to be `Clone`.
#[derive(Clone)]
pub struct ErrorArg(Arc<dyn StdError + Send + Sync>);

impl ErrorArg {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    pub fn get(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Error message followed by its `source()` chain, one cause per line
    pub fn stack_trace(&self) -> String {
        let mut out = self.0.to_string();
        let mut source = self.0.source();
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl fmt::Debug for ErrorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorArg({:?})", self.0)
    }
}

impl fmt::Display for ErrorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for ErrorArg {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// One logged value
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Error(ErrorArg),
}

impl Arg {
    pub fn error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Arg::Error(ErrorArg::new(error))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorArg> {
        match self {
            Arg::Error(e) => Some(e),
            Arg::Value(_) => None,
        }
    }

    /// JSON object fields, if this argument is an object
    pub fn as_object(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            Arg::Value(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Convert to a JSON value; errors become their message text
    pub fn to_json_value(&self) -> Value {
        match self {
            Arg::Value(v) => v.clone(),
            Arg::Error(e) => Value::String(e.to_string()),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(Value::String(s)) => write!(f, "{}", s),
            Arg::Value(v) => write!(f, "{}", v),
            Arg::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Value(Value::String(s.to_string()))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Value(Value::String(s))
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Arg::Value(i.into())
    }
}

impl From<i32> for Arg {
    fn from(i: i32) -> Self {
        Arg::Value(i.into())
    }
}

impl From<u64> for Arg {
    fn from(i: u64) -> Self {
        Arg::Value(i.into())
    }
}

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Arg::Value(f.into())
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Value(Value::Bool(b))
    }
}

impl From<ErrorArg> for Arg {
    fn from(e: ErrorArg) -> Self {
        Arg::Error(e)
    }
}

/// The argument list of a logging call.
///
/// Leveled methods accept `impl Into<Args>` so a single value can be passed
/// directly and several values through the `args!` macro or a `Vec<Arg>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(pub Vec<Arg>);

impl Args {
    pub fn into_vec(self) -> Vec<Arg> {
        self.0
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Args(args)
    }
}

impl From<Arg> for Args {
    fn from(arg: Arg) -> Self {
        Args(vec![arg])
    }
}

impl From<&str> for Args {
    fn from(s: &str) -> Self {
        Args(vec![Arg::from(s)])
    }
}

impl From<String> for Args {
    fn from(s: String) -> Self {
        Args(vec![Arg::from(s)])
    }
}

impl From<Value> for Args {
    fn from(v: Value) -> Self {
        Args(vec![Arg::Value(v)])
    }
}

impl From<ErrorArg> for Args {
    fn from(e: ErrorArg) -> Self {
        Args(vec![Arg::Error(e)])
    }
}

/// A single logging event flowing through a channel
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    timestamp: i64,
    pub level: Level,
    pub args: Vec<Arg>,
    pub context: Option<Arc<LogContext>>,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(level: Level, args: Vec<Arg>, context: Option<Arc<LogContext>>) -> Self {
        Self::with_timestamp(Utc::now().timestamp_millis(), level, args, context)
    }

    pub fn with_timestamp(
        timestamp: i64,
        level: Level,
        args: Vec<Arg>,
        context: Option<Arc<LogContext>>,
    ) -> Self {
        Self {
            timestamp,
            level,
            args,
            context,
        }
    }

    /// Milliseconds since the Unix epoch, fixed at creation
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        datetime_from_millis(self.timestamp)
    }

    /// Mutable access to the context, copying it first if it is shared
    pub fn context_mut(&mut self) -> &mut LogContext {
        Arc::make_mut(self.context.get_or_insert_with(Default::default))
    }
}
