//! Prepends the message time

use crate::core::timestamp::datetime_from_millis;
use crate::core::{Arg, Message, Next, Processor, Result, TimestampFormat};
use serde::{Deserialize, Serialize};

/// Options of [`prepend_date_time`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTimeOptions {
    /// Dim the prefix on terminals (requires the `console` feature)
    pub colorized: bool,
    /// Print only the time of day
    pub no_date: bool,
    pub no_milliseconds: bool,
}

impl DateTimeOptions {
    fn pattern(&self) -> &'static str {
        match (self.no_date, self.no_milliseconds) {
            (false, false) => "%Y-%m-%d %H:%M:%S%.3f",
            (false, true) => "%Y-%m-%d %H:%M:%S",
            (true, false) => "%H:%M:%S%.3f",
            (true, true) => "%H:%M:%S",
        }
    }
}

/// Prepend the UTC date and time the message was created at
///
/// ```
/// use logchain::prelude::*;
///
/// let stage = prepend_date_time(DateTimeOptions {
///     no_date: true,
///     ..Default::default()
/// });
/// assert_eq!(stage.render(0), "00:00:00.000");
/// ```
pub fn prepend_date_time(options: DateTimeOptions) -> PrependDateTime {
    PrependDateTime { options }
}

#[derive(Debug, Clone)]
pub struct PrependDateTime {
    options: DateTimeOptions,
}

impl PrependDateTime {
    /// Render `millis` without colors
    pub fn render(&self, millis: i64) -> String {
        datetime_from_millis(millis)
            .format(self.options.pattern())
            .to_string()
    }

    #[cfg(feature = "console")]
    fn decorate(&self, text: String) -> String {
        use colored::Colorize;
        if self.options.colorized {
            text.dimmed().to_string()
        } else {
            text
        }
    }

    #[cfg(not(feature = "console"))]
    fn decorate(&self, text: String) -> String {
        text
    }
}

impl Processor for PrependDateTime {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            let text = self.decorate(self.render(message.timestamp()));
            message.args.insert(0, Arg::from(text));
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "prepend_date_time"
    }
}

/// Prepend the message timestamp rendered with `format`.
///
/// Numeric formats prepend a number rather than a string.
pub fn prepend_timestamp(format: TimestampFormat) -> PrependTimestamp {
    PrependTimestamp { format }
}

#[derive(Debug, Clone, Default)]
pub struct PrependTimestamp {
    format: TimestampFormat,
}

impl Processor for PrependTimestamp {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            let rendered = self.format.format_millis(message.timestamp());
            let arg = if self.format.is_numeric() {
                rendered
                    .parse::<i64>()
                    .map(Arg::from)
                    .unwrap_or_else(|_| Arg::from(rendered))
            } else {
                Arg::from(rendered)
            };
            message.args.insert(0, arg);
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "prepend_timestamp"
    }
}
