//! Replaces message arguments with one structured object

use crate::core::{Arg, Message, Next, Processor, Result, TimestampFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Options of [`structurize_args`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructurizeOptions {
    pub timestamp_format: TimestampFormat,
    /// Render the level as its lowercase label instead of its number
    pub level_label: bool,
}

impl Default for StructurizeOptions {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::Iso8601,
            level_label: true,
        }
    }
}

pub type PayloadFn = Arc<dyn Fn(&Message) -> Option<Map<String, Value>> + Send + Sync>;

pub fn structurize_args(options: StructurizeOptions) -> StructurizeArgs {
    StructurizeArgs {
        options,
        additional_payload: None,
    }
}

/// Builds `{timestamp, level, ...context, message, stackTrace, ...extra}`
/// from the first argument of each message
pub struct StructurizeArgs {
    options: StructurizeOptions,
    additional_payload: Option<PayloadFn>,
}

impl StructurizeArgs {
    /// Merge extra fields computed per message after everything else
    #[must_use]
    pub fn with_additional_payload<F>(mut self, payload: F) -> Self
    where
        F: Fn(&Message) -> Option<Map<String, Value>> + Send + Sync + 'static,
    {
        self.additional_payload = Some(Arc::new(payload));
        self
    }

    pub fn to_object(&self, message: &Message) -> Map<String, Value> {
        let mut object = Map::new();

        let timestamp = self.options.timestamp_format.format_millis(message.timestamp());
        let timestamp = if self.options.timestamp_format.is_numeric() {
            timestamp
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(timestamp))
        } else {
            Value::String(timestamp)
        };
        object.insert("timestamp".to_string(), timestamp);

        let level = if self.options.level_label {
            Value::from(message.level.to_lowercase_str())
        } else {
            Value::from(message.level.value())
        };
        object.insert("level".to_string(), level);

        if let Some(context) = &message.context {
            context.merge_into(&mut object);
        }

        let (text, stack_trace) = match message.args.first() {
            Some(Arg::Value(Value::String(s))) => (Some(s.clone()), None),
            Some(Arg::Error(error)) => (Some(error.to_string()), Some(error.stack_trace())),
            _ => (None, None),
        };
        set_or_remove(&mut object, "message", text);
        set_or_remove(&mut object, "stackTrace", stack_trace);

        if let Some(payload) = &self.additional_payload {
            if let Some(extra) = payload(message) {
                object.extend(extra);
            }
        }

        object
    }
}

fn set_or_remove(object: &mut Map<String, Value>, key: &str, value: Option<String>) {
    match value {
        Some(value) => {
            object.insert(key.to_string(), Value::String(value));
        }
        None => {
            object.remove(key);
        }
    }
}

impl Processor for StructurizeArgs {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            message.args = vec![Arg::from(Value::Object(self.to_object(message)))];
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "structurize_args"
    }
}
