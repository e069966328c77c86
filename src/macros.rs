//! Logging macros for ergonomic log message formatting.
//!
//! The leveled macros format their arguments like `format!` and log the
//! result as a single string argument. `args!` builds a multi-value
//! argument list for the leveled methods.
//!
//! # Examples
//!
//! ```
//! use logchain::prelude::*;
//! use logchain::{args, info};
//!
//! let logger = Logger::new();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! logger.info(args!["request", 200, serde_json::json!({"path": "/health"})]);
//! ```

/// Log a formatted message at an arbitrary level.
///
/// ```
/// # use logchain::prelude::*;
/// # let logger = Logger::new();
/// use logchain::log;
/// log!(logger, Level::INFO, "Simple message");
/// log!(logger, Level(350), "Between bands: {}", 350);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log_at(level, ::std::format!($($arg)+))
        }
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::TRACE, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($arg)+)
    };
}

/// Log an info-level message.
///
/// ```
/// # use logchain::prelude::*;
/// # let logger = Logger::new();
/// use logchain::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::FATAL, $($arg)+)
    };
}

/// Build an argument list from heterogeneous values.
///
/// ```
/// use logchain::{args, Arg};
///
/// let list = args!["user", 42, true];
/// assert_eq!(list.0, vec![Arg::from("user"), Arg::from(42), Arg::from(true)]);
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        $crate::Args(::std::vec![$($crate::Arg::from($value)),*])
    };
}
