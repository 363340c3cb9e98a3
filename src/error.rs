//! Unified error type for the conversion pipeline.
//!
//! Internal stages return [`Result`]; the public pipeline entry points fold every
//! error into an empty [`SimplificationOutcome`](crate::SimplificationOutcome) so
//! callers always receive a structured value.

use thiserror::Error;

/// Errors raised inside the conversion pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum TrackError {
    /// The input is not well-formed XML.
    #[error("failed to parse track file: {0}")]
    Parse(String),

    /// The input parsed but contained no element at all.
    #[error("failed to parse track file: document has no root element")]
    NoRoot,

    /// Every extraction strategy came back empty.
    #[error("no valid waypoints found")]
    NoWaypoints,

    /// A reduction tier produced a result that violates its own contract.
    #[error("simplification failed: {0}")]
    Simplification(String),

    /// Writing the flight plan failed.
    #[error("failed to write flight plan: {0}")]
    Serialize(String),

    /// File access failed (only raised by callers that read or write files).
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TrackError {
    fn from(err: std::io::Error) -> Self {
        TrackError::Io(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrackError>;
