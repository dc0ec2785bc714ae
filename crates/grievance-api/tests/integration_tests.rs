//! Integration tests for the grievance API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use grievance_api::{
    config::ApiConfig,
    credentials::{AccountDirectory, ProvisionedAccount},
    handlers::{create_router, AppState, GrievanceResponse, HealthCheckResponse, SessionResponse},
    session::{SessionClaims, SessionManager},
};
use grievance_classifier::{ClassificationPipeline, ClassifierConfig};
use grievance_domain::{DepartmentId, Role};
use grievance_llm::GroqProvider;
use grievance_policy::Account;
use grievance_store::SqliteStore;
use serde_json::Value;
use tower::ServiceExt; // for oneshot

const SECRET: &str = "test-secret-key";
const STAFF_PASSWORD: &str = "staff-password";
const CITIZEN_PASSWORD: &str = "citizen-password";

fn provisioned(account: Account) -> ProvisionedAccount {
    ProvisionedAccount {
        account,
        password_hash: bcrypt::hash(STAFF_PASSWORD, 4).unwrap(),
    }
}

/// Helper to create test application state
///
/// The provider points at a loopback port that refuses connections, so every
/// submission exercises the keyword fallback.
fn create_test_state() -> AppState {
    let provider = GroqProvider::new("http://127.0.0.1:9", "llama-3.1-8b-instant", "test-key");
    let config = ClassifierConfig {
        timeout_ms: 5_000,
        ..ClassifierConfig::default()
    };

    AppState::new(
        SessionManager::new(SECRET, 3600),
        ClassificationPipeline::new(provider, config).unwrap(),
        SqliteStore::new(":memory:").unwrap(),
        AccountDirectory::new(
            [
                provisioned(Account::new("water-admin", Role::Admin, [DepartmentId::Water])),
                provisioned(Account::new("root", Role::Superadmin, [])),
            ],
            4,
        ),
    )
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(state: &AppState, body: Value) -> String {
    let (status, json) = send(state, post_json("/api/session", body)).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", json);
    let session: SessionResponse = serde_json::from_value(json).unwrap();
    session.token
}

/// Register a citizen and return the session token it comes with
async fn register(state: &AppState, subject_id: &str) -> String {
    let body = serde_json::json!({ "subject_id": subject_id, "password": CITIZEN_PASSWORD });
    let (status, json) = send(state, post_json("/api/register", body)).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", json);
    let session: SessionResponse = serde_json::from_value(json).unwrap();
    assert_eq!(session.role, "citizen");
    session.token
}

async fn staff_login(state: &AppState, subject_id: &str, role: &str, department: Option<&str>) -> String {
    login(
        state,
        serde_json::json!({
            "subject_id": subject_id,
            "password": STAFF_PASSWORD,
            "role": role,
            "department": department,
        }),
    )
    .await
}

async fn submit(state: &AppState, token: &str, message: &str) -> GrievanceResponse {
    let request = Request::builder()
        .method("POST")
        .uri("/api/grievances")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::json!({ "message": message }).to_string()))
        .unwrap();

    let (status, json) = send(state, request).await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {}", json);
    serde_json::from_value(json).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn patch_status(id: &str, status: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(format!("/api/admin/grievances/{}/status", id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::json!({ "status": status }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let state = create_test_state();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthCheckResponse = serde_json::from_value(json).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "grievance-api");
    assert_eq!(health.classifier, "model");
}

#[tokio::test]
async fn test_department_catalog() {
    let state = create_test_state();
    let request = Request::builder()
        .uri("/api/departments")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);
    let departments = json.as_array().unwrap();
    assert_eq!(departments.len(), 9);
    assert_eq!(departments[0]["id"], "water");
    assert_eq!(departments[0]["sla_hours"], 24);
}

#[tokio::test]
async fn test_water_main_falls_back_to_keywords() {
    let state = create_test_state();
    let token = register(&state, "citizen-1").await;

    let grievance = submit(&state, &token, "Water main burst on Main St, houses flooded").await;

    assert_eq!(grievance.submitter_id, "citizen-1");
    assert_eq!(grievance.predicted_department, "water");
    assert_eq!(grievance.priority, "medium");
    assert_eq!(grievance.confidence, 0.55);
    assert!(grievance.explanation.starts_with("fallback: matched water"));
    assert_eq!(grievance.status, "submitted");
    assert_eq!(grievance.created_at, grievance.updated_at);
}

#[tokio::test]
async fn test_citizen_sees_only_own_grievances() {
    let state = create_test_state();
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;

    let mine = submit(&state, &alice, "Garbage not collected for a week").await;
    submit(&state, &bob, "Pothole swallowed my bicycle wheel").await;

    let (status, json) = send(&state, get("/api/grievances/mine", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<GrievanceResponse> = serde_json::from_value(json).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);

    let (status, _) = send(&state, get(&format!("/api/grievances/{}", mine.id), &alice)).await;
    assert_eq!(status, StatusCode::OK);

    // Someone else's grievance is indistinguishable from a missing one
    let (status, json) = send(&state, get(&format!("/api/grievances/{}", mine.id), &bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Grievance not found");
}

#[tokio::test]
async fn test_own_listing_limit_bounds() {
    let state = create_test_state();
    let token = register(&state, "alice").await;

    let (status, _) = send(&state, get("/api/grievances/mine?limit=101", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&state, get("/api/grievances/mine?limit=0", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_water_admin_scope() {
    let state = create_test_state();
    let citizen = register(&state, "citizen-1").await;
    let water = submit(&state, &citizen, "No water supply since yesterday").await;
    let roads = submit(&state, &citizen, "Huge pothole on the main road").await;
    assert_eq!(roads.predicted_department, "roads");

    let admin = staff_login(&state, "water-admin", "admin", Some("water")).await;

    let (status, json) = send(&state, get("/api/admin/grievances", &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<GrievanceResponse> = serde_json::from_value(json).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, water.id);

    let (status, json) = send(&state, get("/api/admin/grievances?dept=roads", &admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "Access denied");

    let (status, _) = send(&state, get(&format!("/api/grievances/{}", roads.id), &admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&state, patch_status(&roads.id, "resolved", &admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&state, patch_status(&water.id, "resolved", &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let updated: GrievanceResponse = serde_json::from_value(json).unwrap();
    assert_eq!(updated.status, "resolved");
    assert_eq!(updated.predicted_department, water.predicted_department);
    assert_eq!(updated.confidence, water.confidence);
    assert!(updated.updated_at >= water.updated_at);

    let (status, json) = send(
        &state,
        get("/api/admin/grievances?status=resolved", &admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_update_validation() {
    let state = create_test_state();
    let citizen = register(&state, "citizen-1").await;
    let grievance = submit(&state, &citizen, "Streetlight broken for a month").await;

    // Submitters cannot move their own grievances
    let (status, _) = send(&state, patch_status(&grievance.id, "resolved", &citizen)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let root = staff_login(&state, "root", "superadmin", None).await;
    let (status, _) = send(&state, patch_status(&grievance.id, "submitted", &root)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&state, patch_status(&grievance.id, "closed", &root)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&state, patch_status(&grievance.id, "in_progress", &root)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_superadmin_listing() {
    let state = create_test_state();
    let citizen = register(&state, "citizen-1").await;
    submit(&state, &citizen, "No water supply since yesterday").await;
    submit(&state, &citizen, "Huge pothole on the main road").await;

    let root = staff_login(&state, "root", "superadmin", None).await;

    let (status, json) = send(&state, get("/api/admin/grievances", &root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = send(&state, get("/api/admin/grievances?dept=roads", &root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    // Unknown label: authorized, nothing can match
    let (status, json) = send(&state, get("/api/admin/grievances?dept=zoo", &root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 0);

    let (status, _) = send(&state, get("/api/admin/grievances?status=closed", &root)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rules() {
    let state = create_test_state();
    register(&state, "eve").await;

    // Registered citizens cannot escalate
    let (status, _) = send(
        &state,
        post_json(
            "/api/session",
            serde_json::json!({
                "subject_id": "eve",
                "password": CITIZEN_PASSWORD,
                "role": "admin",
                "department": "water",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &state,
        post_json(
            "/api/session",
            serde_json::json!({"subject_id": "water-admin", "password": STAFF_PASSWORD, "role": "admin"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &state,
        post_json(
            "/api/session",
            serde_json::json!({"subject_id": "water-admin", "password": STAFF_PASSWORD, "role": "mayor"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        &state,
        post_json(
            "/api/session",
            serde_json::json!({
                "subject_id": "root",
                "password": STAFF_PASSWORD,
                "role": "admin",
                "department": "police",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["department_ids"], serde_json::json!(["police"]));
}

#[tokio::test]
async fn test_sessions_require_a_password() {
    let state = create_test_state();
    let alice = register(&state, "alice").await;
    let grievance = submit(&state, &alice, "Robbery at my house last night").await;

    // Naming a subject is not enough, for citizens or for staff
    for body in [
        serde_json::json!({"subject_id": "alice"}),
        serde_json::json!({"subject_id": "alice", "password": "not-her-password"}),
        serde_json::json!({"subject_id": "root", "role": "superadmin"}),
        serde_json::json!({"subject_id": "root", "password": CITIZEN_PASSWORD, "role": "superadmin"}),
        serde_json::json!({"subject_id": "mallory", "password": STAFF_PASSWORD}),
    ] {
        let (status, json) = send(&state, post_json("/api/session", body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Incorrect subject or password");
    }

    let token = login(
        &state,
        serde_json::json!({"subject_id": "alice", "password": CITIZEN_PASSWORD}),
    )
    .await;
    let (status, json) = send(&state, get(&format!("/api/grievances/{}", grievance.id), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Robbery at my house last night");
}

#[tokio::test]
async fn test_registration_rules() {
    let state = create_test_state();
    register(&state, "alice").await;

    let cases = [
        (serde_json::json!({"subject_id": "alice", "password": "another-password"}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"subject_id": "root", "password": "another-password"}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"subject_id": "bob", "password": "short"}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"subject_id": "   ", "password": "long-enough"}), StatusCode::BAD_REQUEST),
    ];
    for (body, expected) in cases {
        let (status, _) = send(&state, post_json("/api/register", body)).await;
        assert_eq!(status, expected);
    }

    // The first registration still holds
    login(
        &state,
        serde_json::json!({"subject_id": "alice", "password": CITIZEN_PASSWORD}),
    )
    .await;
}

#[tokio::test]
async fn test_skip_beyond_sqlite_range_rejected() {
    let state = create_test_state();
    let token = register(&state, "alice").await;

    let uri = format!("/api/grievances/mine?skip={}", u64::MAX);
    let (status, _) = send(&state, get(&uri, &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let root = staff_login(&state, "root", "superadmin", None).await;
    let uri = format!("/api/admin/grievances?skip={}", u64::MAX);
    let (status, _) = send(&state, get(&uri, &root)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let state = create_test_state();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = SessionClaims {
        sub: "citizen-1".to_string(),
        role: "citizen".to_string(),
        department_ids: Vec::new(),
        exp: now - 100,
        iat: now - 200,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, json) = send(&state, get("/api/grievances/mine", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Session expired");

    let (status, json) = send(&state, get("/api/grievances/mine", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid token");
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("api.toml");
    std::fs::write(
        &path,
        r#"
            bind_address = "127.0.0.1"
            bind_port = 9100
            jwt_secret = "file-secret"
            database_path = "grievances.db"
        "#,
    )
    .unwrap();

    let config = ApiConfig::from_file(&path).unwrap();
    assert_eq!(config.bind_addr(), "127.0.0.1:9100");
    assert!(ApiConfig::from_file(dir.path().join("missing.toml")).is_err());
}
