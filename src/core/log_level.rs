//! Log level definitions
//!
//! Levels are plain integers: higher is more severe. The six well-known
//! bands sit 100 apart so custom levels can be slotted between them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub u32);

impl Level {
    /// Finer-grained informational events than `DEBUG`
    pub const TRACE: Level = Level(100);
    /// Fine-grained events most useful to debug an application
    pub const DEBUG: Level = Level(200);
    /// Coarse-grained progress of the application
    pub const INFO: Level = Level(300);
    /// Potentially harmful situations
    pub const WARN: Level = Level(400);
    /// Errors that still allow the application to continue running
    pub const ERROR: Level = Level(500);
    /// Severe errors that will presumably lead the application to abort
    pub const FATAL: Level = Level(600);
    /// Above every band; used as a threshold it turns dispatch off
    pub const OFF: Level = Level(u32::MAX);

    /// The lowest possible threshold: everything passes
    pub const ALL: Level = Level(0);

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Resolve a band name, case-insensitively. Unknown names resolve to
    /// `Level(0)`; use `str::parse` to reject them instead.
    pub fn from_name(name: &str) -> Level {
        name.parse().unwrap_or(Level::ALL)
    }

    /// Uppercase label of the band this value falls into
    pub fn to_str(self) -> &'static str {
        if self < Level::DEBUG {
            "TRACE"
        } else if self < Level::INFO {
            "DEBUG"
        } else if self < Level::WARN {
            "INFO"
        } else if self < Level::ERROR {
            "WARN"
        } else if self < Level::FATAL {
            "ERROR"
        } else {
            "FATAL"
        }
    }

    /// Lowercase label of the band this value falls into
    pub fn to_lowercase_str(self) -> &'static str {
        if self < Level::DEBUG {
            "trace"
        } else if self < Level::INFO {
            "debug"
        } else if self < Level::WARN {
            "info"
        } else if self < Level::ERROR {
            "warn"
        } else if self < Level::FATAL {
            "error"
        } else {
            "fatal"
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(self) -> colored::Color {
        use colored::Color::*;
        if self < Level::DEBUG {
            BrightBlack
        } else if self < Level::INFO {
            Blue
        } else if self < Level::WARN {
            Green
        } else if self < Level::ERROR {
            Yellow
        } else if self < Level::FATAL {
            Red
        } else {
            BrightRed
        }
    }
}

impl From<u32> for Level {
    fn from(value: u32) -> Self {
        Level(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Level::OFF {
            write!(f, "OFF")
        } else {
            write!(f, "{}", self.to_str())
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(Level::TRACE),
            "DEBUG" => Ok(Level::DEBUG),
            "INFO" => Ok(Level::INFO),
            "WARN" | "WARNING" => Ok(Level::WARN),
            "ERROR" => Ok(Level::ERROR),
            "FATAL" => Ok(Level::FATAL),
            "OFF" => Ok(Level::OFF),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
