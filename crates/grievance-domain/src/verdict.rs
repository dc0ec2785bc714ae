//! Classification verdict module

use crate::{DepartmentId, Priority};
use std::fmt;

/// Explanation prefix marking a verdict produced by the keyword fallback
pub const FALLBACK_PREFIX: &str = "fallback:";

/// Reasons a verdict cannot be constructed
#[derive(Debug, Clone, PartialEq)]
pub enum VerdictError {
    /// Confidence was NaN, infinite, or outside [0, 1]
    ConfidenceOutOfRange(f64),
}

impl fmt::Display for VerdictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictError::ConfidenceOutOfRange(c) => {
                write!(f, "confidence must be in [0, 1], got {}", c)
            }
        }
    }
}

impl std::error::Error for VerdictError {}

/// A fully validated classification result
///
/// The department and priority are closed enums and the constructor checks
/// the confidence range, so holders of a verdict never re-validate it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationVerdict {
    department: DepartmentId,
    priority: Priority,
    confidence: f64,
    explanation: String,
}

impl ClassificationVerdict {
    /// Create a verdict
    ///
    /// # Errors
    /// Returns error if confidence is not a finite value in [0, 1]
    pub fn new(
        department: DepartmentId,
        priority: Priority,
        confidence: f64,
        explanation: impl Into<String>,
    ) -> Result<Self, VerdictError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(VerdictError::ConfidenceOutOfRange(confidence));
        }

        Ok(Self {
            department,
            priority,
            confidence,
            explanation: explanation.into(),
        })
    }

    /// Routed department
    pub fn department(&self) -> DepartmentId {
        self.department
    }

    /// Priority
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Short rationale
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Whether the keyword fallback produced this verdict
    pub fn is_fallback(&self) -> bool {
        self.explanation.starts_with(FALLBACK_PREFIX)
    }
}
