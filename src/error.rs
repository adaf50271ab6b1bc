use std::backtrace::Backtrace;
use thiserror::Error;

/// [`MonitorErrorVariant`] is an enumeration of all the specific error
/// variants that can occur while driving the soccer-monitoring pipeline:
/// malformed stream lines, unknown game-interruption ids, sensor updates
/// addressed to entities that do not own the sensor, and I/O failures on the
/// stream, metadata and output files.
#[derive(Error, Debug, Clone)]
pub enum MonitorErrorVariant {
    #[error("Line {0:?} matches no known event")]
    UnknownLine(String),

    #[error("Unknown game interruption event id {0}")]
    UnknownInterruptionId(u32),

    #[error("Sensor {sid} is not registered for this entity")]
    UnknownSensor { sid: u32 },

    #[error("No position is registered for sensor {sid}")]
    NoPositionForSensor { sid: u32 },

    #[error("{name:?} is missing from the field snapshot")]
    MissingFromSnapshot { name: String },

    #[error("Metadata file {path:?} not found or unreadable: {message}")]
    MetadataNotFound { path: String, message: String },

    #[error("Error reading from the event stream: {0}")]
    StreamRead(String),

    #[error("Error writing statistics output: {0}")]
    OutputWrite(String),
}

/// [`MonitorError`] provides an error variant [`MonitorErrorVariant`] along
/// with the backtrace captured where it was raised.
#[derive(Debug)]
pub struct MonitorError {
    pub backtrace: Backtrace,
    pub variant: MonitorErrorVariant,
}

impl MonitorError {
    pub fn new(variant: MonitorErrorVariant) -> Self {
        Self {
            backtrace: Backtrace::capture(),
            variant,
        }
    }

    pub fn new_result<T>(variant: MonitorErrorVariant) -> Result<T, Self> {
        Err(Self::new(variant))
    }
}

#[allow(clippy::result_large_err)]
pub type MonitorResult<T> = Result<T, MonitorError>;
