//! Error types for the classifier
//!
//! None of these reach callers of the pipeline: every one of them ends in
//! the keyword fallback. They exist so the degraded path can say why.

use thiserror::Error;

/// Why a model response could not become a verdict
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No JSON object could be extracted by any strategy
    #[error("no JSON object found in response")]
    NoJsonObject,

    /// A required key was absent
    #[error("missing key '{0}'")]
    MissingKey(&'static str),

    /// Department was not one of the closed labels
    #[error("unknown department '{0}'")]
    UnknownDepartment(String),

    /// Priority was not one of the closed labels
    #[error("unknown priority '{0}'")]
    UnknownPriority(String),

    /// Confidence was not a number in [0, 1]
    #[error("invalid confidence: {0}")]
    InvalidConfidence(String),

    /// A field had the wrong JSON type
    #[error("field '{0}' has the wrong type")]
    WrongType(&'static str),

    /// Explanation carried the marker reserved for keyword verdicts
    #[error("explanation uses the reserved fallback marker")]
    ReservedExplanation,
}

/// Errors raised while setting up a classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
