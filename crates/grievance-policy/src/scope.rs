//! Session scope selection at login

use crate::error::ScopeError;
use grievance_domain::{DepartmentId, Principal, Role};
use std::collections::BTreeSet;

/// Stored account data consulted once, when a session is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Stable subject identifier
    pub subject_id: String,

    /// Highest role the account holds
    pub role: Role,

    /// Departments the account is provisioned for
    pub provisioned_departments: BTreeSet<DepartmentId>,
}

impl Account {
    /// Create an account
    pub fn new(
        subject_id: impl Into<String>,
        role: Role,
        provisioned_departments: impl IntoIterator<Item = DepartmentId>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
            provisioned_departments: provisioned_departments.into_iter().collect(),
        }
    }

    /// Whether the account may open a session with `requested` role
    pub fn permits_role(&self, requested: Role) -> bool {
        match self.role {
            Role::Citizen => requested == Role::Citizen,
            Role::Admin => requested != Role::Superadmin,
            Role::Superadmin => true,
        }
    }
}

/// Build the principal for a new session
///
/// The scope chosen here is frozen into the session: later provisioning
/// changes only apply to sessions opened afterwards. An admin session is
/// always scoped to exactly one department.
pub fn open_session(
    account: &Account,
    requested_role: Role,
    requested_department: Option<&str>,
) -> Result<Principal, ScopeError> {
    if !account.permits_role(requested_role) {
        return Err(ScopeError::RoleNotPermitted(requested_role));
    }

    let scope: BTreeSet<DepartmentId> = match requested_role {
        Role::Citizen => BTreeSet::new(),
        Role::Admin => {
            let raw = requested_department
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .ok_or(ScopeError::DepartmentRequired)?;
            let department = DepartmentId::parse(raw)
                .ok_or_else(|| ScopeError::UnknownDepartment(raw.to_string()))?;

            if account.role != Role::Superadmin
                && !account.provisioned_departments.contains(&department)
            {
                return Err(ScopeError::DepartmentNotProvisioned);
            }
            BTreeSet::from([department])
        }
        Role::Superadmin => account.provisioned_departments.clone(),
    };

    Ok(Principal::new(
        account.subject_id.clone(),
        requested_role,
        scope,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_account() -> Account {
        Account::new("admin-1", Role::Admin, [DepartmentId::Water, DepartmentId::Roads])
    }

    #[test]
    fn test_citizen_session() {
        let account = Account::new("user-1", Role::Citizen, []);
        let principal = open_session(&account, Role::Citizen, None).unwrap();
        assert_eq!(principal.role(), Role::Citizen);
        assert!(principal.department_scope().is_empty());
    }

    #[test]
    fn test_citizen_session_ignores_department() {
        let principal = open_session(&admin_account(), Role::Citizen, Some("water")).unwrap();
        assert_eq!(principal.subject_id(), "admin-1");
        assert!(principal.department_scope().is_empty());
    }

    #[test]
    fn test_role_escalation_refused() {
        let citizen = Account::new("user-1", Role::Citizen, []);
        assert_eq!(
            open_session(&citizen, Role::Admin, Some("water")),
            Err(ScopeError::RoleNotPermitted(Role::Admin))
        );
        assert_eq!(
            open_session(&admin_account(), Role::Superadmin, None),
            Err(ScopeError::RoleNotPermitted(Role::Superadmin))
        );
    }

    #[test]
    fn test_admin_session_scoped_to_one_department() {
        let principal = open_session(&admin_account(), Role::Admin, Some("roads")).unwrap();
        assert_eq!(
            principal.department_scope(),
            &BTreeSet::from([DepartmentId::Roads])
        );
    }

    #[test]
    fn test_admin_session_requires_department() {
        assert_eq!(
            open_session(&admin_account(), Role::Admin, None),
            Err(ScopeError::DepartmentRequired)
        );
        assert_eq!(
            open_session(&admin_account(), Role::Admin, Some("  ")),
            Err(ScopeError::DepartmentRequired)
        );
    }

    #[test]
    fn test_admin_session_department_checks() {
        assert_eq!(
            open_session(&admin_account(), Role::Admin, Some("police")),
            Err(ScopeError::DepartmentNotProvisioned)
        );
        assert_eq!(
            open_session(&admin_account(), Role::Admin, Some("parks")),
            Err(ScopeError::UnknownDepartment("parks".to_string()))
        );
    }

    #[test]
    fn test_superadmin_may_pick_any_admin_department() {
        let root = Account::new("root-1", Role::Superadmin, []);
        let principal = open_session(&root, Role::Admin, Some("police")).unwrap();
        assert_eq!(principal.role(), Role::Admin);
        assert!(principal.scope_contains(DepartmentId::Police));
    }

    #[test]
    fn test_superadmin_session_carries_provisioned_scope() {
        let root = Account::new("root-1", Role::Superadmin, [DepartmentId::Health]);
        let principal = open_session(&root, Role::Superadmin, Some("water")).unwrap();
        assert_eq!(
            principal.department_scope(),
            &BTreeSet::from([DepartmentId::Health])
        );
    }

    #[test]
    fn test_empty_subject_rejected() {
        let account = Account::new("", Role::Citizen, []);
        assert_eq!(
            open_session(&account, Role::Citizen, None),
            Err(ScopeError::Principal(grievance_domain::PrincipalError::EmptySubject))
        );
    }
}
