//! Console sink

use crate::core::{
    Arg, ChannelBinding, DispatchFailure, Level, LoggerEvent, Message, Next, Processor, Result,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;

/// Output stream a message is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsoleStream {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl ConsoleStream {
    /// Stream for the band `level` falls into; `FATAL` shares `Error`
    pub fn for_level(level: Level) -> Self {
        if level < Level::DEBUG {
            ConsoleStream::Trace
        } else if level < Level::INFO {
            ConsoleStream::Debug
        } else if level < Level::WARN {
            ConsoleStream::Info
        } else if level < Level::ERROR {
            ConsoleStream::Warn
        } else {
            ConsoleStream::Error
        }
    }

    /// Whether the stream goes to stderr on a standard console
    pub fn is_stderr(self) -> bool {
        matches!(self, ConsoleStream::Warn | ConsoleStream::Error)
    }
}

/// Destination of console output
pub trait ConsoleWriter: Send + Sync + 'static {
    fn write(&self, stream: ConsoleStream, line: &str) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<W: ConsoleWriter> ConsoleWriter for Arc<W> {
    fn write(&self, stream: ConsoleStream, line: &str) -> Result<()> {
        (**self).write(stream, line)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Writes trace, debug and info to stdout; warn and error to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl ConsoleWriter for StdConsole {
    fn write(&self, stream: ConsoleStream, line: &str) -> Result<()> {
        if stream.is_stderr() {
            writeln!(std::io::stderr().lock(), "{}", line)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", line)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}

/// Options of [`write_to_console`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleOptions {
    /// Color lines by level (requires the `console` feature)
    pub colorized: bool,
}

/// Write each message to the standard console
pub fn write_to_console(options: ConsoleOptions) -> WriteToConsole<StdConsole> {
    write_to_console_with(StdConsole, options)
}

/// Write each message through a custom console writer
pub fn write_to_console_with<W: ConsoleWriter>(
    writer: W,
    options: ConsoleOptions,
) -> WriteToConsole<W> {
    WriteToConsole {
        writer: Arc::new(writer),
        options,
    }
}

pub struct WriteToConsole<W> {
    writer: Arc<W>,
    options: ConsoleOptions,
}

impl<W: ConsoleWriter> WriteToConsole<W> {
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Arguments joined by single spaces
    pub fn format_line(&self, message: &Message) -> String {
        let line = message
            .args
            .iter()
            .map(Arg::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        self.colorize(message.level, line)
    }

    #[cfg(feature = "console")]
    fn colorize(&self, level: Level, line: String) -> String {
        use colored::Colorize;
        if self.options.colorized {
            line.color(level.color_code()).to_string()
        } else {
            line
        }
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, _level: Level, line: String) -> String {
        line
    }
}

impl<W: ConsoleWriter> Processor for WriteToConsole<W> {
    fn process(&self, messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &messages {
            let stream = ConsoleStream::for_level(message.level);
            self.writer.write(stream, &self.format_line(message))?;
        }
        next.call(messages)
    }

    fn bind(&mut self, binding: &ChannelBinding) -> Result<()> {
        let writer = Arc::clone(&self.writer);
        let failures = binding.failures().clone();
        let channel = binding.channel();
        binding.subscribe(move |event| {
            if *event == LoggerEvent::Flush {
                if let Err(e) = writer.flush() {
                    failures.report(DispatchFailure::channel(channel, e));
                }
            }
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "write_to_console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(ConsoleStream, String)>>,
    }

    impl ConsoleWriter for Capture {
        fn write(&self, stream: ConsoleStream, line: &str) -> Result<()> {
            self.lines.lock().push((stream, line.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_stream_mapping() {
        assert_eq!(ConsoleStream::for_level(Level::TRACE), ConsoleStream::Trace);
        assert_eq!(ConsoleStream::for_level(Level::DEBUG), ConsoleStream::Debug);
        assert_eq!(ConsoleStream::for_level(Level::INFO), ConsoleStream::Info);
        assert_eq!(ConsoleStream::for_level(Level::WARN), ConsoleStream::Warn);
        assert_eq!(ConsoleStream::for_level(Level::ERROR), ConsoleStream::Error);
        assert_eq!(ConsoleStream::for_level(Level::FATAL), ConsoleStream::Error);
        assert_eq!(ConsoleStream::for_level(Level(0)), ConsoleStream::Trace);
    }

    #[test]
    fn test_writes_joined_args_and_forwards() {
        let capture = Arc::new(Capture::default());
        let stage = write_to_console_with(Arc::clone(&capture), ConsoleOptions::default());
        let forwarded = Arc::new(Mutex::new(0));
        let forwarded_clone = Arc::clone(&forwarded);
        let next = Next::from_fn(move |messages: Vec<Message>| {
            *forwarded_clone.lock() += messages.len();
            Ok(())
        });

        let message = Message::new(Level::WARN, vec![Arg::from("low disk:"), Arg::from(5)], None);
        stage.process(vec![message], &next).unwrap();

        assert_eq!(
            *capture.lines.lock(),
            vec![(ConsoleStream::Warn, "low disk: 5".to_string())]
        );
        assert_eq!(*forwarded.lock(), 1);
    }
}
