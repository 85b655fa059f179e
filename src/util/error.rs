//! Error types for the c3d-anim library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for recording import/export operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The recording carries no POINT data at all
    #[error("No POINT data in recording: {0}")]
    NoPointData(String),

    /// Unit of a data section could not be determined
    #[error("Unit of {section} data could not be determined: {reason}")]
    Unit { section: String, reason: String },

    /// Parameter exists but has an unexpected type or shape
    #[error("Invalid parameter {group}:{name}: {reason}")]
    InvalidParameter {
        group: String,
        name: String,
        reason: String,
    },

    /// Frame block was indexed outside the declared frame range
    #[error("Frame {frame} outside recording range [{first}, {last}]")]
    FrameOutOfRange { frame: i64, first: i64, last: i64 },

    /// Frame block carries a different number of point channels than declared
    #[error("Frame {frame} has {actual} point channels, expected {expected}")]
    LabelCountMismatch {
        frame: i64,
        expected: usize,
        actual: usize,
    },

    /// Invalid data structure in a recording or scene
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Axis identifier could not be parsed
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    /// Entity, action or curve lookup failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write operation failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a unit error for a data section.
    pub fn unit(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unit {
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn parameter(group: &str, name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            group: group.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for c3d-anim operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::NoPointData("walk.c3d".into());
        assert!(e.to_string().contains("POINT"));

        let e = Error::FrameOutOfRange { frame: 12, first: 1, last: 10 };
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("10"));

        let e = Error::unit("POINT", "missing UNITS");
        assert!(e.to_string().contains("POINT"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parameter_error_names_parameter() {
        let e = Error::parameter("POINT", "UNITS", "int16, not a string");
        assert_eq!(e.to_string(), "Invalid parameter POINT:UNITS: int16, not a string");
    }
}
