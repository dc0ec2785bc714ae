//! Grievance Domain Layer
//!
//! Core value types and trait seams for the municipal grievance router.
//! The only external dependency is `uuid` for grievance identifiers;
//! serialization, transport and storage live in other crates.
//!
//! ## Key Concepts
//!
//! - **Grievance**: a citizen complaint with an immutable classification record
//! - **Verdict**: a validated (department, priority, confidence, explanation) result
//! - **Principal**: the authenticated identity plus the department scope captured at login
//! - **Closed vocabularies**: departments, priorities, statuses and roles are enums,
//!   so every decision point matches exhaustively
//!
//! ## Architecture
//!
//! - Pure business types only
//! - Infrastructure implementations (HTTP model client, SQLite) live elsewhere
//! - Trait definitions for all external interactions in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod department;
pub mod grievance;
pub mod principal;
pub mod priority;
pub mod query;
pub mod role;
pub mod status;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use department::{Department, DepartmentId};
pub use grievance::{Grievance, GrievanceId};
pub use principal::{Principal, PrincipalError};
pub use priority::Priority;
pub use query::{GrievanceQuery, QueryFilter};
pub use role::Role;
pub use status::GrievanceStatus;
pub use verdict::{ClassificationVerdict, VerdictError, FALLBACK_PREFIX};
