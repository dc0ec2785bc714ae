//! Status module - grievance lifecycle

use std::fmt;

/// Grievance status
///
/// Every grievance starts as `Submitted`. Staff may move it to any of the
/// other three; nothing moves it back to `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrievanceStatus {
    /// Initial state
    Submitted,
    /// Picked up by a department
    InProgress,
    /// Closed as fixed
    Resolved,
    /// Closed without action
    Rejected,
}

impl GrievanceStatus {
    /// Get the wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            GrievanceStatus::Submitted => "submitted",
            GrievanceStatus::InProgress => "in_progress",
            GrievanceStatus::Resolved => "resolved",
            GrievanceStatus::Rejected => "rejected",
        }
    }

    /// Parse an exact wire label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(GrievanceStatus::Submitted),
            "in_progress" => Some(GrievanceStatus::InProgress),
            "resolved" => Some(GrievanceStatus::Resolved),
            "rejected" => Some(GrievanceStatus::Rejected),
            _ => None,
        }
    }

    /// Whether staff may set this status through a status update
    pub fn is_update_target(&self) -> bool {
        match self {
            GrievanceStatus::Submitted => false,
            GrievanceStatus::InProgress | GrievanceStatus::Resolved | GrievanceStatus::Rejected => {
                true
            }
        }
    }
}

impl fmt::Display for GrievanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GrievanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid status: {}", s))
    }
}
