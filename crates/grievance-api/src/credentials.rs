//! Password credentials for session establishment.
//!
//! Staff accounts are provisioned in configuration with a bcrypt hash.
//! Citizens register themselves and their hashes live in the store. Hashing
//! and verification run on the blocking pool.

use grievance_policy::Account;
use std::collections::HashMap;
use thiserror::Error;

/// Accepted password length, in bytes; bcrypt ignores anything past 72
pub const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 8..=72;

/// Credential error
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown subject, missing password, or wrong password
    #[error("Incorrect subject or password")]
    InvalidCredentials,

    /// Password outside the accepted length
    #[error("password must be between 8 and 72 bytes")]
    WeakPassword,

    /// Hashing or verification failed
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// The blocking task did not complete
    #[error("Password worker failed: {0}")]
    Worker(String),
}

/// A configured account and its password hash
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    /// Role and departments the login rules check
    pub account: Account,
    /// bcrypt hash of the account password
    pub password_hash: String,
}

/// Provisioned accounts by subject, plus the cost for new hashes
#[derive(Debug, Clone)]
pub struct AccountDirectory {
    provisioned: HashMap<String, ProvisionedAccount>,
    hash_cost: u32,
}

impl AccountDirectory {
    /// Build a directory; later entries replace earlier ones for a subject
    pub fn new(accounts: impl IntoIterator<Item = ProvisionedAccount>, hash_cost: u32) -> Self {
        Self {
            provisioned: accounts
                .into_iter()
                .map(|p| (p.account.subject_id.clone(), p))
                .collect(),
            hash_cost,
        }
    }

    /// Configured account for a subject
    pub fn provisioned(&self, subject_id: &str) -> Option<&ProvisionedAccount> {
        self.provisioned.get(subject_id)
    }

    /// Number of configured accounts
    pub fn len(&self) -> usize {
        self.provisioned.len()
    }

    /// True when no accounts are configured
    pub fn is_empty(&self) -> bool {
        self.provisioned.is_empty()
    }

    /// bcrypt cost for hashes created at registration
    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }
}

/// Hash a new password
pub async fn hash_password(password: String, cost: u32) -> Result<String, CredentialError> {
    if !PASSWORD_LENGTH.contains(&password.len()) {
        return Err(CredentialError::WeakPassword);
    }

    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| CredentialError::Worker(e.to_string()))?
        .map_err(CredentialError::from)
}

/// Check a password against a stored hash
///
/// An empty password never matches.
pub async fn verify_password(password: String, hash: String) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::InvalidCredentials);
    }

    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| CredentialError::Worker(e.to_string()))??;

    if matched {
        Ok(())
    } else {
        Err(CredentialError::InvalidCredentials)
    }
}

/// Structural check for a bcrypt hash from configuration
pub fn is_bcrypt_hash(hash: &str) -> bool {
    let mut parts = hash.split('$');
    matches!(
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()),
        (Some(""), Some("2a" | "2b" | "2x" | "2y"), Some(cost), Some(rest), None)
            if cost.len() == 2 && cost.bytes().all(|b| b.is_ascii_digit()) && rest.len() == 53
    )
}
