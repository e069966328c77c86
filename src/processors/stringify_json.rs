//! Squashes message arguments into a single JSON line

use crate::core::timestamp::iso8601_millis;
use crate::core::{Arg, Message, Next, Processor, Result};
use serde_json::{Map, Value};

/// Replace each message's arguments with one JSON string.
///
/// The object holds `timestamp` (ISO 8601), `level` (lowercase label) and
/// `message`, the concatenation of every string and number argument.
/// Object arguments are merged in and may override those keys; context
/// fields fill in keys that are still missing. The first error argument
/// is stored under `error`.
///
/// ```
/// use logchain::prelude::*;
///
/// let stage = stringify_json();
/// let message = Message::with_timestamp(0, Level::WARN, vec![Arg::from("disk "), Arg::from(91)], None);
/// let line = stage.render(&message).unwrap();
/// let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
/// assert_eq!(
///     parsed,
///     serde_json::json!({
///         "timestamp": "1970-01-01T00:00:00.000Z",
///         "level": "warn",
///         "message": "disk 91",
///     })
/// );
/// ```
pub fn stringify_json() -> StringifyJson {
    StringifyJson
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringifyJson;

impl StringifyJson {
    pub fn to_object(&self, message: &Message) -> Map<String, Value> {
        let mut fields = Map::new();
        let mut error: Option<Value> = None;
        let mut text: Option<Value> = None;
        for arg in &message.args {
            match arg {
                Arg::Value(Value::Object(object)) => {
                    for (key, value) in object {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                Arg::Value(piece @ (Value::String(_) | Value::Number(_))) => {
                    text = Some(match text {
                        None => piece.clone(),
                        Some(prev) => Value::String(concat(&prev, piece)),
                    });
                }
                Arg::Error(err) => {
                    error.get_or_insert_with(|| Value::String(err.stack_trace()));
                }
                Arg::Value(_) => {}
            }
        }

        // Key order: timestamp, level, message, then everything else
        let mut blob = Map::new();
        blob.insert(
            "timestamp".to_string(),
            Value::String(iso8601_millis(message.timestamp())),
        );
        blob.insert(
            "level".to_string(),
            Value::String(message.level.to_lowercase_str().to_string()),
        );
        let text = text.filter(|text| *text != Value::String(String::new()));
        if let Some(text) = fields.get("message").cloned().or(text) {
            blob.insert("message".to_string(), text);
        }
        for (key, value) in fields {
            if key != "message" {
                blob.insert(key, value);
            }
        }
        if let Some(error) = error {
            blob.entry("error").or_insert(error);
        }

        if let Some(context) = &message.context {
            context.merge_into(&mut blob);
        }

        blob
    }

    pub fn render(&self, message: &Message) -> Result<String> {
        Ok(serde_json::to_string(&self.to_object(message))?)
    }
}

fn concat(prev: &Value, piece: &Value) -> String {
    let mut out = match prev {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match piece {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
    out
}

impl Processor for StringifyJson {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            let line = self.render(message)?;
            message.args = vec![Arg::from(line)];
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "stringify_json"
    }
}
