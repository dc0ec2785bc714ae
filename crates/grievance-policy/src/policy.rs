//! Department-scoped access decisions

use crate::error::AccessError;
use grievance_domain::{DepartmentId, Grievance, Principal, QueryFilter, Role};

/// Result of scoping an administrative listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Authorized; run the query with this filter
    Filter(QueryFilter),

    /// Not authorized; report a permission failure
    Denied,

    /// Authorized, but nothing can match; return an empty list
    Empty,
}

/// The access policy
///
/// Pure decisions over a [`Principal`] and, where relevant, a grievance.
/// Holds no state, performs no I/O, and never consults live account data:
/// the scope captured in the session is the whole truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Create the policy
    pub fn new() -> Self {
        Self
    }

    /// Any authenticated principal may submit, always as itself
    pub fn can_create(&self, principal: &Principal) -> bool {
        match principal.role() {
            Role::Citizen | Role::Admin | Role::Superadmin => true,
        }
    }

    /// Owner, superadmin, or admin scoped to the grievance's department
    pub fn can_read(&self, principal: &Principal, grievance: &Grievance) -> bool {
        if principal.subject_id() == grievance.submitter_id() {
            return true;
        }
        self.has_department_authority(principal, grievance.department())
    }

    /// Superadmin, or admin scoped to the grievance's department
    ///
    /// Ownership grants nothing here: submitters cannot move their own
    /// grievances.
    pub fn can_update_status(&self, principal: &Principal, grievance: &Grievance) -> bool {
        self.has_department_authority(principal, grievance.department())
    }

    /// Scope the administrative listing
    ///
    /// `requested_department` is the raw query-string value, if any.
    pub fn scope_list_query(
        &self,
        principal: &Principal,
        requested_department: Option<&str>,
    ) -> ListScope {
        match (principal.role(), requested_department) {
            (Role::Citizen, _) => ListScope::Denied,

            (Role::Admin, Some(requested)) => match DepartmentId::parse(requested) {
                Some(department) if principal.scope_contains(department) => {
                    ListScope::Filter(QueryFilter::DepartmentEquals(department))
                }
                _ => ListScope::Denied,
            },
            (Role::Admin, None) => {
                if principal.department_scope().is_empty() {
                    ListScope::Empty
                } else {
                    ListScope::Filter(QueryFilter::DepartmentIn(
                        principal.department_scope().clone(),
                    ))
                }
            }

            (Role::Superadmin, Some(requested)) => match DepartmentId::parse(requested) {
                Some(department) => ListScope::Filter(QueryFilter::DepartmentEquals(department)),
                None => ListScope::Empty,
            },
            (Role::Superadmin, None) => ListScope::Filter(QueryFilter::Unrestricted),
        }
    }

    /// Filter for the "my grievances" path; no department clause, ever
    pub fn scope_own_query(&self, principal: &Principal) -> QueryFilter {
        QueryFilter::SubmitterEquals(principal.subject_id().to_string())
    }

    /// Resolve a looked-up grievance for reading
    ///
    /// A grievance the principal may not read is reported exactly like a
    /// missing one, so existence does not leak across departments.
    pub fn authorize_read<'g>(
        &self,
        principal: &Principal,
        grievance: Option<&'g Grievance>,
    ) -> Result<&'g Grievance, AccessError> {
        match grievance {
            Some(g) if self.can_read(principal, g) => Ok(g),
            _ => Err(AccessError::NotFound),
        }
    }

    /// Resolve a looked-up grievance for a status update
    ///
    /// Citizens are refused before any lookup matters. For staff, an
    /// out-of-scope grievance is reported exactly like a missing one.
    pub fn authorize_status_update<'g>(
        &self,
        principal: &Principal,
        grievance: Option<&'g Grievance>,
    ) -> Result<&'g Grievance, AccessError> {
        if !principal.role().is_staff() {
            return Err(AccessError::Denied);
        }
        match grievance {
            Some(g) if self.can_update_status(principal, g) => Ok(g),
            _ => Err(AccessError::NotFound),
        }
    }

    fn has_department_authority(&self, principal: &Principal, department: DepartmentId) -> bool {
        match principal.role() {
            Role::Citizen => false,
            Role::Admin => principal.scope_contains(department),
            Role::Superadmin => true,
        }
    }
}
