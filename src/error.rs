/// Error types shared by the controller modules
///
/// The GUI only needs to know which family an error belongs to (serial
/// or file) to pick the dialog text; the full error goes to the log.

use thiserror::Error;

use crate::checkpoints::Axis;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("No serial port selected")]
    NoPortSelected,

    #[error("Failed to open serial port '{port}' at {baud_rate} baud: {source}")]
    SerialOpen {
        port: String,
        baud_rate: u32,
        #[source]
        source: serialport::Error,
    },

    #[error("Serial write failed after {sent} line(s): {source}")]
    SerialWrite {
        sent: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: expected 5 fields, found {found}")]
    FieldCount { row: usize, found: usize },

    #[error("Row {row}, {axis} axis: '{value}' is not a number")]
    NotNumeric { row: usize, axis: Axis, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification used for user-facing reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Serial,
    File,
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::NoPortSelected
            | ControllerError::SerialOpen { .. }
            | ControllerError::SerialWrite { .. } => ErrorKind::Serial,
            ControllerError::Csv(_)
            | ControllerError::FieldCount { .. }
            | ControllerError::NotNumeric { .. }
            | ControllerError::Io(_) => ErrorKind::File,
        }
    }

    /// Lines that reached the wire before the failure, if known
    pub fn lines_sent(&self) -> Option<usize> {
        match self {
            ControllerError::SerialWrite { sent, .. } => Some(*sent),
            ControllerError::NoPortSelected | ControllerError::SerialOpen { .. } => Some(0),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;
