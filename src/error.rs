// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the form analysis library.

use std::fmt;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Main error type for the form analysis library.
#[derive(Debug)]
pub enum AnalysisError {
    /// No professional reference sequence is loaded for the exercise.
    ReferenceNotFound(String),
    /// The rule table could not be read or parsed.
    RuleSourceError(String),
    /// A reference keypoint file could not be read or parsed.
    ReferenceSourceError(String),
    /// A keypoint sequence violates its ordering invariant.
    InvalidSequence(String),
    /// A value could not be parsed (operator, severity, exercise data).
    ParseError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceNotFound(exercise) => {
                write!(f, "No reference found for exercise: {exercise}")
            }
            Self::RuleSourceError(msg) => write!(f, "Rule source error: {msg}"),
            Self::ReferenceSourceError(msg) => write!(f, "Reference source error: {msg}"),
            Self::InvalidSequence(msg) => write!(f, "Invalid sequence: {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        Self::RuleSourceError(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
