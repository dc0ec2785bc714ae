//! Policy error types

use grievance_domain::{PrincipalError, Role};
use thiserror::Error;

/// Outcome of a denied single-resource access
///
/// Messages are fixed and never name the department that would have been
/// required.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The principal may not perform the action
    #[error("Access denied")]
    Denied,

    /// No such grievance, or one the principal may not know about
    #[error("Grievance not found")]
    NotFound,
}

/// Errors opening a session for an account
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The account may not assume the requested role
    #[error("You do not have {0} access")]
    RoleNotPermitted(Role),

    /// An admin session needs a department
    #[error("Department selection required for admin login")]
    DepartmentRequired,

    /// The requested department is not a known label
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    /// The account is not provisioned for the requested department
    #[error("You do not have access to this department")]
    DepartmentNotProvisioned,

    /// The resulting principal was malformed
    #[error("Invalid principal: {0}")]
    Principal(#[from] PrincipalError),
}
