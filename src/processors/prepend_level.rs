//! Prepends a fixed-width severity label

use crate::core::{Arg, Level, Message, Next, Processor, Result};

/// Five-character label of the band `level` falls into
pub fn padded_label(level: Level) -> &'static str {
    match level.to_str() {
        "INFO" => "INFO ",
        "WARN" => "WARN ",
        label => label,
    }
}

pub fn prepend_level() -> PrependLevel {
    PrependLevel
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrependLevel;

impl Processor for PrependLevel {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            message.args.insert(0, Arg::from(padded_label(message.level)));
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "prepend_level"
    }
}
