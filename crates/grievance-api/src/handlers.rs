//! HTTP request handlers for the grievance service.
//!
//! Every grievance route authenticates from the bearer token, asks the
//! access policy, and only then touches storage. The store lock is never
//! held across an `.await`.

use crate::credentials::{hash_password, verify_password, AccountDirectory, CredentialError};
use crate::session::{SessionError, SessionManager};
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router as AxumRouter,
};
use grievance_classifier::ClassificationPipeline;
use grievance_domain::traits::GrievanceStore;
use grievance_domain::{
    Department, Grievance, GrievanceId, GrievanceQuery, GrievanceStatus, Principal, Role,
};
use grievance_llm::GroqProvider;
use grievance_policy::{open_session, AccessError, AccessPolicy, Account, ListScope, ScopeError};
use grievance_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Accepted message length, in characters
pub const MESSAGE_LENGTH: std::ops::RangeInclusive<usize> = 10..=2000;

/// Largest page on the "my grievances" path
pub const MAX_OWN_PAGE: usize = 100;

/// Largest page on the administrative listing
pub const MAX_ADMIN_PAGE: usize = 10_000;

const DEFAULT_OWN_PAGE: usize = 10;
const DEFAULT_ADMIN_PAGE: usize = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session manager for JWT token operations
    pub session_manager: Arc<SessionManager>,
    /// Classification pipeline
    pub pipeline: Arc<ClassificationPipeline<GroqProvider>>,
    /// Grievance storage
    pub store: Arc<Mutex<SqliteStore>>,
    /// Access policy
    pub policy: AccessPolicy,
    /// Provisioned accounts and their credentials
    pub accounts: Arc<AccountDirectory>,
}

impl AppState {
    /// Assemble the state from its parts
    pub fn new(
        session_manager: SessionManager,
        pipeline: ClassificationPipeline<GroqProvider>,
        store: SqliteStore,
        accounts: AccountDirectory,
    ) -> Self {
        Self {
            session_manager: Arc::new(session_manager),
            pipeline: Arc::new(pipeline),
            store: Arc::new(Mutex::new(store)),
            policy: AccessPolicy::new(),
            accounts: Arc::new(accounts),
        }
    }

    /// Account and password hash for a subject
    ///
    /// Configured accounts shadow registered citizens. Unknown subjects get
    /// the same error as a wrong password.
    fn credential_for(&self, subject_id: &str) -> Result<(Account, String), AppError> {
        if let Some(provisioned) = self.accounts.provisioned(subject_id) {
            return Ok((provisioned.account.clone(), provisioned.password_hash.clone()));
        }

        let hash = self.lock_store()?.citizen_password_hash(subject_id)?;
        hash.map(|h| (Account::new(subject_id, Role::Citizen, []), h))
            .ok_or(AppError::CredentialError(CredentialError::InvalidCredentials))
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, SqliteStore>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::InternalError("Store lock poisoned".to_string()))
    }
}

/// Session establishment request
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Subject signing in
    pub subject_id: String,
    /// Account password
    #[serde(default)]
    pub password: String,
    /// Requested session role (default: citizen)
    #[serde(default = "default_role")]
    pub role: String,
    /// Department to administer; required for admin sessions
    #[serde(default)]
    pub department: Option<String>,
}

fn default_role() -> String {
    Role::Citizen.as_str().to_string()
}

/// Citizen self-registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Subject to register
    pub subject_id: String,
    /// Password, 8 to 72 bytes
    pub password: String,
}

/// Session establishment response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// JWT session token
    pub token: String,
    /// Session role
    pub role: String,
    /// Department scope captured in the token
    pub department_ids: Vec<String>,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// "model" when a provider is configured, otherwise "fallback-only"
    pub classifier: String,
}

/// Department catalog entry
#[derive(Debug, Serialize, Deserialize)]
pub struct DepartmentResponse {
    /// Label
    pub id: String,
    /// Display name
    pub name: String,
    /// Resolution target in hours
    pub sla_hours: u32,
    /// Contact address
    pub contact_email: String,
}

impl From<&Department> for DepartmentResponse {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.as_str().to_string(),
            name: d.display_name.to_string(),
            sla_hours: d.sla_hours,
            contact_email: d.contact_email.to_string(),
        }
    }
}

/// Grievance submission request
#[derive(Debug, Deserialize)]
pub struct CreateGrievanceRequest {
    /// Complaint text
    pub message: String,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    /// New status: in_progress, resolved or rejected
    pub status: String,
}

/// Paging for the "my grievances" path
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Rows to skip
    pub skip: Option<usize>,
    /// Maximum rows to return
    pub limit: Option<usize>,
}

/// Filters and paging for the administrative listing
#[derive(Debug, Default, Deserialize)]
pub struct AdminListParams {
    /// Requested department label
    pub dept: Option<String>,
    /// Requested status
    pub status: Option<String>,
    /// Rows to skip
    pub skip: Option<usize>,
    /// Maximum rows to return
    pub limit: Option<usize>,
}

/// A grievance as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrievanceResponse {
    /// Identifier
    pub id: String,
    /// Submitting subject
    pub submitter_id: String,
    /// Complaint text
    pub message: String,
    /// Department assigned at submission
    pub predicted_department: String,
    /// Priority assigned at submission
    pub priority: String,
    /// Classification confidence in [0, 1]
    pub confidence: f64,
    /// Classification rationale
    pub explanation: String,
    /// Lifecycle status
    pub status: String,
    /// Submission time (Unix ms)
    pub created_at: u64,
    /// Last status change (Unix ms)
    pub updated_at: u64,
}

impl From<&Grievance> for GrievanceResponse {
    fn from(g: &Grievance) -> Self {
        let verdict = g.classification();
        Self {
            id: g.id().to_string(),
            submitter_id: g.submitter_id().to_string(),
            message: g.message().to_string(),
            predicted_department: verdict.department().as_str().to_string(),
            priority: verdict.priority().as_str().to_string(),
            confidence: verdict.confidence(),
            explanation: verdict.explanation().to_string(),
            status: g.status().as_str().to_string(),
            created_at: g.created_at(),
            updated_at: g.updated_at(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed
    SessionError(SessionError),
    /// Access decision refused the request
    AccessError(AccessError),
    /// Login rules refused the session
    ScopeError(ScopeError),
    /// Credentials were refused or could not be checked
    CredentialError(CredentialError),
    /// Malformed request
    BadRequest(String),
    /// Storage failure
    StoreError(StoreError),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SessionError(SessionError::JwtEncode(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::SessionError(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AppError::AccessError(e @ AccessError::Denied) => (StatusCode::FORBIDDEN, e.to_string()),
            AppError::AccessError(e @ AccessError::NotFound) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::ScopeError(
                e @ (ScopeError::RoleNotPermitted(_) | ScopeError::DepartmentNotProvisioned),
            ) => (StatusCode::FORBIDDEN, e.to_string()),
            AppError::ScopeError(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::CredentialError(e @ CredentialError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, e.to_string())
            }
            AppError::CredentialError(e @ CredentialError::WeakPassword) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::CredentialError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::StoreError(e @ StoreError::SubjectTaken(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::StoreError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::SessionError(e)
    }
}

impl From<AccessError> for AppError {
    fn from(e: AccessError) -> Self {
        AppError::AccessError(e)
    }
}

impl From<ScopeError> for AppError {
    fn from(e: ScopeError) -> Self {
        AppError::ScopeError(e)
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        AppError::CredentialError(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreError(e)
    }
}

/// Resolve the bearer token into a principal
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(SessionError::InvalidToken)?;

    state.session_manager.validate(token).map_err(|e| {
        warn!("Rejected session token: {}", e);
        AppError::from(e)
    })
}

/// Malformed identifiers cannot name a grievance, so they read as missing
fn parse_grievance_id(raw: &str) -> Result<GrievanceId, AppError> {
    GrievanceId::from_string(raw).map_err(|_| AppError::AccessError(AccessError::NotFound))
}

/// SQLite cannot page past `i64::MAX` rows
fn page_offset(requested: Option<usize>) -> Result<usize, AppError> {
    match requested.unwrap_or(0) {
        skip if i64::try_from(skip).is_ok() => Ok(skip),
        skip => Err(AppError::BadRequest(format!("skip out of range: {}", skip))),
    }
}

fn page_limit(requested: Option<usize>, default: usize, max: usize) -> Result<usize, AppError> {
    match requested.unwrap_or(default) {
        limit if (1..=max).contains(&limit) => Ok(limit),
        limit => Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}, got {}",
            max, limit
        ))),
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn session_response(state: &AppState, principal: &Principal) -> Result<SessionResponse, AppError> {
    Ok(SessionResponse {
        token: state.session_manager.issue(principal)?,
        role: principal.role().as_str().to_string(),
        department_ids: principal
            .department_scope()
            .iter()
            .map(|d| d.as_str().to_string())
            .collect(),
        expires_in: state.session_manager.token_expiry_secs(),
    })
}

/// POST /api/register - Register a citizen and open a citizen session
async fn register_citizen(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let principal = Principal::citizen(request.subject_id.trim())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if state.accounts.provisioned(principal.subject_id()).is_some() {
        return Err(StoreError::SubjectTaken(principal.subject_id().to_string()).into());
    }

    let hash = hash_password(request.password, state.accounts.hash_cost()).await?;
    state
        .lock_store()?
        .register_citizen(principal.subject_id(), &hash, now_millis())?;

    info!("Registered citizen {}", principal.subject_id());

    Ok((StatusCode::CREATED, Json(session_response(&state, &principal)?)))
}

/// POST /api/session - Open a session for a subject
async fn establish_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (account, password_hash) = state.credential_for(&request.subject_id)?;
    verify_password(request.password, password_hash)
        .await
        .inspect_err(|_| warn!("Refused sign-in for {}", request.subject_id))?;

    let role = Role::parse(&request.role)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown role: {}", request.role)))?;
    let principal = open_session(&account, role, request.department.as_deref())?;

    info!(
        "Opened {} session for {} ({} departments)",
        principal.role(),
        principal.subject_id(),
        principal.department_scope().len()
    );

    Ok(Json(session_response(&state, &principal)?))
}

/// GET /health - Service health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let classifier = if state.pipeline.has_provider() {
        "model"
    } else {
        "fallback-only"
    };

    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        service: "grievance-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: classifier.to_string(),
    })
}

/// GET /api/departments - Department catalog
async fn list_departments() -> Json<Vec<DepartmentResponse>> {
    Json(Department::catalog().iter().map(DepartmentResponse::from).collect())
}

/// POST /api/grievances - Classify and store a new grievance
async fn create_grievance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateGrievanceRequest>,
) -> Result<(StatusCode, Json<GrievanceResponse>), AppError> {
    let principal = authenticate(&state, &headers)?;
    if !state.policy.can_create(&principal) {
        return Err(AccessError::Denied.into());
    }

    let length = request.message.chars().count();
    if !MESSAGE_LENGTH.contains(&length) {
        return Err(AppError::BadRequest(format!(
            "message must be between {} and {} characters, got {}",
            MESSAGE_LENGTH.start(),
            MESSAGE_LENGTH.end(),
            length
        )));
    }

    let outcome = state.pipeline.classify(&request.message).await;
    let degraded = outcome.is_degraded();

    // Always filed as the caller
    let grievance = Grievance::submit(
        principal.subject_id(),
        request.message,
        outcome.into_verdict(),
        now_millis(),
    );
    state.lock_store()?.insert(&grievance)?;

    info!(
        "Grievance {} filed under {} ({}){}",
        grievance.id(),
        grievance.department(),
        grievance.classification().priority(),
        if degraded { " via keyword fallback" } else { "" }
    );

    Ok((StatusCode::CREATED, Json(GrievanceResponse::from(&grievance))))
}

/// GET /api/grievances/mine - The caller's own grievances
async fn list_my_grievances(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<GrievanceResponse>>, AppError> {
    let principal = authenticate(&state, &headers)?;
    let limit = page_limit(params.limit, DEFAULT_OWN_PAGE, MAX_OWN_PAGE)?;

    let query = GrievanceQuery::new(state.policy.scope_own_query(&principal))
        .with_page(page_offset(params.skip)?, limit);
    let grievances = state.lock_store()?.list(&query)?;

    Ok(Json(grievances.iter().map(GrievanceResponse::from).collect()))
}

/// GET /api/grievances/:id - A single grievance
async fn get_grievance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<GrievanceResponse>, AppError> {
    let principal = authenticate(&state, &headers)?;
    let id = parse_grievance_id(&id)?;

    let found = state.lock_store()?.get(id)?;
    let grievance = state.policy.authorize_read(&principal, found.as_ref())?;

    Ok(Json(GrievanceResponse::from(grievance)))
}

/// GET /api/admin/grievances - Department-scoped listing for staff
async fn list_admin_grievances(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Vec<GrievanceResponse>>, AppError> {
    let principal = authenticate(&state, &headers)?;

    let filter = match state
        .policy
        .scope_list_query(&principal, params.dept.as_deref())
    {
        ListScope::Denied => return Err(AccessError::Denied.into()),
        ListScope::Empty => return Ok(Json(Vec::new())),
        ListScope::Filter(filter) => filter,
    };

    let status = params
        .status
        .as_deref()
        .map(|s| {
            GrievanceStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {}", s)))
        })
        .transpose()?;
    let limit = page_limit(params.limit, DEFAULT_ADMIN_PAGE, MAX_ADMIN_PAGE)?;

    let query = GrievanceQuery::new(filter)
        .with_status(status)
        .with_page(page_offset(params.skip)?, limit);
    let grievances = state.lock_store()?.list(&query)?;

    Ok(Json(grievances.iter().map(GrievanceResponse::from).collect()))
}

/// PATCH /api/admin/grievances/:id/status - Move a grievance along
async fn update_grievance_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<GrievanceResponse>, AppError> {
    let principal = authenticate(&state, &headers)?;
    if !principal.role().is_staff() {
        return Err(AccessError::Denied.into());
    }

    let status = GrievanceStatus::parse(&request.status)
        .filter(GrievanceStatus::is_update_target)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "status must be one of in_progress, resolved, rejected; got {}",
                request.status
            ))
        })?;
    let id = parse_grievance_id(&id)?;

    let mut store = state.lock_store()?;
    let found = store.get(id)?;
    state
        .policy
        .authorize_status_update(&principal, found.as_ref())?;

    let updated = store
        .update_status(id, status, now_millis())?
        .ok_or(AccessError::NotFound)?;
    drop(store);

    info!(
        "Grievance {} moved to {} by {}",
        updated.id(),
        updated.status(),
        principal.subject_id()
    );

    Ok(Json(GrievanceResponse::from(&updated)))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register_citizen))
        .route("/api/session", post(establish_session))
        .route("/api/departments", get(list_departments))
        .route("/api/grievances", post(create_grievance))
        .route("/api/grievances/mine", get(list_my_grievances))
        .route("/api/grievances/:id", get(get_grievance))
        .route("/api/admin/grievances", get(list_admin_grievances))
        .route(
            "/api/admin/grievances/:id/status",
            patch(update_grievance_status),
        )
        .with_state(state)
}
