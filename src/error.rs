//! Error types for nexrad-l2

use std::io;
use thiserror::Error;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding or querying a volume
#[derive(Debug, Error)]
pub enum DecodeError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Container or compression framing is not recognized or is corrupt
    #[error("{0}")]
    Format(String),

    /// A structure extends past the end of the available bytes
    #[error(
        "Truncated {context} at offset {offset}: need {needed} bytes, {available} available"
    )]
    Truncated {
        /// Structure being decoded
        context: &'static str,
        /// Offset of the structure within its buffer
        offset: usize,
        /// Bytes required
        needed: usize,
        /// Bytes actually present
        available: usize,
    },

    /// Data required by the caller is not present in the volume
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A typed record asked its schema for a field it does not carry
    #[error("Schema {schema} has no field {field} of the requested type")]
    Schema {
        /// Schema name
        schema: &'static str,
        /// Field name
        field: &'static str,
    },

    /// Scan index past the number of retained scans
    #[error("Scan {scan} out of range: volume has {nscans} scans")]
    ScanOutOfRange {
        /// Requested scan index
        scan: usize,
        /// Number of retained scans
        nscans: usize,
    },

    /// Moment name is not one of the known data moments
    #[error("Unknown moment: {0}")]
    UnknownMoment(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DecodeError {
    /// Whether this error is one the record framer can skip past
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
