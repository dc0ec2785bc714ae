//! Grievance Access Policy
//!
//! Decides who may do what to which grievance.
//!
//! The policy provides:
//! - Per-grievance read and status-update checks
//! - Scoped filters for administrative and "my grievances" listings
//! - Resolution of looked-up grievances with not-found concealment
//! - Session scope selection at login
//!
//! Everything here is pure: decisions depend only on the [`Principal`] carried
//! by the session and the grievance in question.
//!
//! # Examples
//!
//! ```
//! use grievance_domain::{DepartmentId, QueryFilter, Role};
//! use grievance_policy::{open_session, AccessPolicy, Account, ListScope};
//!
//! let account = Account::new("admin-7", Role::Admin, [DepartmentId::Water]);
//! let principal = open_session(&account, Role::Admin, Some("water")).unwrap();
//!
//! let policy = AccessPolicy::new();
//! assert_eq!(
//!     policy.scope_list_query(&principal, Some("water")),
//!     ListScope::Filter(QueryFilter::DepartmentEquals(DepartmentId::Water))
//! );
//! assert_eq!(policy.scope_list_query(&principal, Some("roads")), ListScope::Denied);
//! ```
//!
//! [`Principal`]: grievance_domain::Principal

#![warn(missing_docs)]

mod error;
mod policy;
mod scope;

pub use error::{AccessError, ScopeError};
pub use policy::{AccessPolicy, ListScope};
pub use scope::{open_session, Account};
