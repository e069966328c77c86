//! Reference processors
//!
//! Each factory returns a concrete processor; wrap it with `Stage::new`
//! to add it to a channel.

pub mod batch_messages;
pub mod level_cutoff;
pub mod prepend_args;
pub mod prepend_date_time;
pub mod prepend_level;
pub mod send_to_reporter;
pub mod stringify_json;
pub mod structurize_args;
pub mod transform_args;
pub mod write_to_console;

pub use batch_messages::{
    batch_messages, BatchMessages, BatchOptions, DEFAULT_BATCH_LIMIT, DEFAULT_BATCH_TIMEOUT,
};
pub use level_cutoff::{level_cutoff, LevelCutoff};
pub use prepend_args::{prepend_args, PrependArgs};
pub use prepend_date_time::{
    prepend_date_time, prepend_timestamp, DateTimeOptions, PrependDateTime, PrependTimestamp,
};
pub use prepend_level::{padded_label, prepend_level, PrependLevel};
pub use send_to_reporter::{
    reporter_level, send_to_reporter, CaptureOptions, ErrorReporter, ReportedMessage,
    SendToReporter,
};
pub use stringify_json::{stringify_json, StringifyJson};
pub use structurize_args::{structurize_args, StructurizeArgs, StructurizeOptions};
pub use transform_args::{inspect, inspect_args, transform_args, InspectArgs, TransformArgs};
pub use write_to_console::{
    write_to_console, write_to_console_with, ConsoleOptions, ConsoleStream, ConsoleWriter,
    StdConsole, WriteToConsole,
};
