//! Pipeline outcome types

use crate::error::ParseError;
use grievance_domain::ClassificationVerdict;
use thiserror::Error;

/// Why the pipeline fell back to the keyword classifier
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegradedReason {
    /// No model credential is configured
    #[error("no model provider configured")]
    NoProvider,

    /// The model call exceeded its timeout
    #[error("model call timed out")]
    Timeout,

    /// The provider failed (transport, non-2xx, envelope)
    #[error("model call failed: {0}")]
    Provider(String),

    /// The response could not be parsed or validated
    #[error("malformed model response: {0}")]
    Malformed(ParseError),
}

/// Terminal state of the classification pipeline
///
/// Both branches carry a complete verdict; the split exists so callers and
/// logs can tell a model verdict from a heuristic one.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// The model produced a valid verdict
    Accepted(ClassificationVerdict),

    /// The keyword fallback produced the verdict
    Fallback {
        /// Fallback verdict
        verdict: ClassificationVerdict,
        /// What went wrong on the model path
        reason: DegradedReason,
    },
}

impl ClassificationOutcome {
    /// The verdict, whichever branch produced it
    pub fn verdict(&self) -> &ClassificationVerdict {
        match self {
            ClassificationOutcome::Accepted(verdict) => verdict,
            ClassificationOutcome::Fallback { verdict, .. } => verdict,
        }
    }

    /// Consume the outcome and keep the verdict
    pub fn into_verdict(self) -> ClassificationVerdict {
        match self {
            ClassificationOutcome::Accepted(verdict) => verdict,
            ClassificationOutcome::Fallback { verdict, .. } => verdict,
        }
    }

    /// Whether the fallback path was taken
    pub fn is_degraded(&self) -> bool {
        matches!(self, ClassificationOutcome::Fallback { .. })
    }

    /// Degradation reason, if any
    pub fn degraded_reason(&self) -> Option<&DegradedReason> {
        match self {
            ClassificationOutcome::Accepted(_) => None,
            ClassificationOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}
