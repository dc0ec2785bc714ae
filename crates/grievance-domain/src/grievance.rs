//! Grievance module - a citizen complaint and its classification record

use crate::{ClassificationVerdict, GrievanceStatus};
use std::fmt;

/// Unique identifier for a grievance based on UUIDv7
///
/// UUIDv7 sorts chronologically, which keeps "newest first" listings cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GrievanceId(u128);

impl GrievanceId {
    /// Generate a new UUIDv7-based GrievanceId
    ///
    /// # Examples
    ///
    /// ```
    /// use grievance_domain::GrievanceId;
    ///
    /// let id = GrievanceId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a GrievanceId from a raw u128 value (storage layer)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a GrievanceId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use grievance_domain::GrievanceId;
    ///
    /// let id = GrievanceId::new();
    /// let parsed = GrievanceId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// assert!(GrievanceId::from_string("not-a-uuid").is_err());
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid grievance id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for GrievanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GrievanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A grievance
///
/// The classification is written once at submission and never changes.
/// `status` (with `updated_at`) is the only field that moves afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Grievance {
    id: GrievanceId,
    submitter_id: String,
    message: String,
    classification: ClassificationVerdict,
    status: GrievanceStatus,
    created_at: u64,
    updated_at: u64,
}

impl Grievance {
    /// Create a freshly submitted grievance
    pub fn submit(
        submitter_id: impl Into<String>,
        message: impl Into<String>,
        classification: ClassificationVerdict,
        now: u64,
    ) -> Self {
        Self {
            id: GrievanceId::new(),
            submitter_id: submitter_id.into(),
            message: message.into(),
            classification,
            status: GrievanceStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a grievance from stored fields
    pub fn restore(
        id: GrievanceId,
        submitter_id: String,
        message: String,
        classification: ClassificationVerdict,
        status: GrievanceStatus,
        created_at: u64,
        updated_at: u64,
    ) -> Self {
        Self {
            id,
            submitter_id,
            message,
            classification,
            status,
            created_at,
            updated_at,
        }
    }

    /// Return a copy with a new status; classification is carried unchanged
    pub fn with_status(&self, status: GrievanceStatus, now: u64) -> Self {
        Self {
            status,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Identifier
    pub fn id(&self) -> GrievanceId {
        self.id
    }

    /// Subject who submitted it
    pub fn submitter_id(&self) -> &str {
        &self.submitter_id
    }

    /// Original complaint text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Immutable classification record
    pub fn classification(&self) -> &ClassificationVerdict {
        &self.classification
    }

    /// Routed department (shorthand for `classification().department()`)
    pub fn department(&self) -> crate::DepartmentId {
        self.classification.department()
    }

    /// Current status
    pub fn status(&self) -> GrievanceStatus {
        self.status
    }

    /// Creation time (Unix milliseconds)
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Last status change (Unix milliseconds)
    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }
}
