//! Principal module - the authenticated identity and its department scope

use crate::{DepartmentId, Role};
use std::collections::BTreeSet;
use std::fmt;

/// Reasons a principal cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    /// Subject identifier was empty
    EmptySubject,
    /// A citizen session carried department scope
    CitizenWithScope,
}

impl fmt::Display for PrincipalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalError::EmptySubject => f.write_str("subject id cannot be empty"),
            PrincipalError::CitizenWithScope => {
                f.write_str("citizen sessions cannot carry department scope")
            }
        }
    }
}

impl std::error::Error for PrincipalError {}

/// Authenticated identity plus the department scope captured at login
///
/// A principal is a capability for one request: it is never re-derived from
/// the account record, so re-provisioning an account does not change what an
/// already issued session may do.
///
/// Scope semantics depend on the role:
/// - citizen: always empty
/// - admin: the departments chosen at login; empty means no access
/// - superadmin: empty means all departments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject_id: String,
    role: Role,
    department_scope: BTreeSet<DepartmentId>,
}

impl Principal {
    /// Create a principal
    ///
    /// # Errors
    /// Returns error if the subject is empty or a citizen is given scope
    pub fn new(
        subject_id: impl Into<String>,
        role: Role,
        department_scope: impl IntoIterator<Item = DepartmentId>,
    ) -> Result<Self, PrincipalError> {
        let subject_id = subject_id.into();
        if subject_id.is_empty() {
            return Err(PrincipalError::EmptySubject);
        }

        let department_scope: BTreeSet<_> = department_scope.into_iter().collect();
        if role == Role::Citizen && !department_scope.is_empty() {
            return Err(PrincipalError::CitizenWithScope);
        }

        Ok(Self {
            subject_id,
            role,
            department_scope,
        })
    }

    /// Create a citizen principal
    pub fn citizen(subject_id: impl Into<String>) -> Result<Self, PrincipalError> {
        Self::new(subject_id, Role::Citizen, [])
    }

    /// Subject identifier
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Session role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Department scope captured at login
    pub fn department_scope(&self) -> &BTreeSet<DepartmentId> {
        &self.department_scope
    }

    /// Whether the scope explicitly names a department
    pub fn scope_contains(&self, department: DepartmentId) -> bool {
        self.department_scope.contains(&department)
    }
}
