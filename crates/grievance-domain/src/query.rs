//! Query module - the scoped filters the access policy hands to storage

use crate::{DepartmentId, GrievanceStatus};
use std::collections::BTreeSet;

/// Row filter produced by the access policy
///
/// These are the only shapes storage ever receives for a listing, so an
/// unscoped query cannot be assembled by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// No department clause
    Unrestricted,
    /// `department = X`
    DepartmentEquals(DepartmentId),
    /// `department IN S` (S is never empty)
    DepartmentIn(BTreeSet<DepartmentId>),
    /// `submitter_id = Y`
    SubmitterEquals(String),
}

/// A listing request as executed by storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrievanceQuery {
    /// Scope clause from the access policy
    pub filter: QueryFilter,

    /// Optional status clause
    pub status: Option<GrievanceStatus>,

    /// Rows to skip
    pub offset: usize,

    /// Maximum rows to return
    pub limit: usize,
}

impl GrievanceQuery {
    /// Create a query with default paging (first 10 rows)
    pub fn new(filter: QueryFilter) -> Self {
        Self {
            filter,
            status: None,
            offset: 0,
            limit: 10,
        }
    }

    /// Restrict to one status
    pub fn with_status(mut self, status: Option<GrievanceStatus>) -> Self {
        self.status = status;
        self
    }

    /// Set paging
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}
