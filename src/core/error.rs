//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A processor returned an error while handling a batch
    #[error("Processor '{processor}' failed: {message}")]
    ProcessorFailed { processor: String, message: String },

    /// A processor panicked while handling a batch
    #[error("Processor panicked: {message}")]
    ProcessorPanicked { message: String },

    /// A terminal sink rejected a message
    #[error("Sink '{sink}' failed: {message}")]
    SinkError { sink: String, message: String },

    /// A control-event listener panicked
    #[error("Event listener panicked: {message}")]
    ListenerPanicked { message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a processor failure
    pub fn processor(processor: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ProcessorFailed {
            processor: processor.into(),
            message: message.into(),
        }
    }

    /// Create a sink failure
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Build an error from a payload caught by `catch_unwind`
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        LoggerError::ProcessorPanicked {
            message: panic_message(payload.as_ref()),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
