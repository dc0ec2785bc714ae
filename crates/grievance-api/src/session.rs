//! Session management with JWT tokens.
//!
//! A token carries the principal chosen at login: subject, role and the
//! department scope. Scope is never re-read from account data while the
//! token is valid.

use grievance_domain::{DepartmentId, Principal, Role};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// Token expired
    #[error("Session expired")]
    TokenExpired,

    /// Missing, malformed, forged, or semantically invalid token
    #[error("Invalid token")]
    InvalidToken,
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject identifier
    pub sub: String,

    /// Session role
    pub role: String,

    /// Department scope captured at login
    #[serde(default)]
    pub department_ids: Vec<String>,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

impl SessionClaims {
    /// Rebuild the principal; any unknown label invalidates the token
    pub fn to_principal(&self) -> Result<Principal, SessionError> {
        let role = Role::parse(&self.role).ok_or(SessionError::InvalidToken)?;
        let scope = self
            .department_ids
            .iter()
            .map(|d| DepartmentId::parse(d).ok_or(SessionError::InvalidToken))
            .collect::<Result<Vec<_>, _>>()?;

        Principal::new(self.sub.clone(), role, scope).map_err(|_| SessionError::InvalidToken)
    }
}

/// Session manager handles JWT token generation and validation
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl SessionManager {
    /// Create a new session manager with the given JWT secret and expiry
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Token lifetime in seconds
    pub fn token_expiry_secs(&self) -> u64 {
        self.token_expiry_secs
    }

    /// Issue a session token for the given principal
    pub fn issue(&self, principal: &Principal) -> Result<String, SessionError> {
        let now = unix_now_secs();

        let claims = SessionClaims {
            sub: principal.subject_id().to_string(),
            role: principal.role().as_str().to_string(),
            department_ids: principal
                .department_scope()
                .iter()
                .map(|d| d.as_str().to_string())
                .collect(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a session token and extract its principal
    pub fn validate(&self, token: &str) -> Result<Principal, SessionError> {
        let validation = Validation::default();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        token_data.claims.to_principal()
    }
}

fn unix_now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
