//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in other crates and are injected by the caller.

use crate::{Grievance, GrievanceId, GrievanceQuery, GrievanceStatus};
use std::time::Duration;

/// A single-shot text completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fixed system instruction
    pub system: String,

    /// User content (the raw grievance text)
    pub user: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound for the whole call
    pub timeout: Duration,
}

/// Trait for text-completion providers
///
/// Implemented by the infrastructure layer (grievance-llm). Calls are
/// blocking; async callers run them on a blocking pool.
pub trait CompletionProvider {
    /// Error type for provider operations
    type Error;

    /// Run one completion and return the raw model text
    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error>;
}

/// Trait for storing and retrieving grievances
///
/// Implemented by the infrastructure layer (grievance-store)
pub trait GrievanceStore {
    /// Error type for store operations
    type Error;

    /// Persist a newly submitted grievance
    fn insert(&mut self, grievance: &Grievance) -> Result<GrievanceId, Self::Error>;

    /// Get a grievance by ID
    fn get(&self, id: GrievanceId) -> Result<Option<Grievance>, Self::Error>;

    /// List grievances matching a scoped query, newest first
    fn list(&self, query: &GrievanceQuery) -> Result<Vec<Grievance>, Self::Error>;

    /// Change the status of a grievance; returns the updated record
    fn update_status(
        &mut self,
        id: GrievanceId,
        status: GrievanceStatus,
        now: u64,
    ) -> Result<Option<Grievance>, Self::Error>;
}
