//! Configuration file parsing for the API service.
//!
//! Loads settings from TOML files including bind address, JWT secret,
//! token expiry, database path, classifier and model settings, and the
//! provisioned staff accounts.

use crate::credentials::{is_bcrypt_hash, AccountDirectory, ProvisionedAccount};
use grievance_classifier::ClassifierConfig;
use grievance_domain::{DepartmentId, Role};
use grievance_llm::GroqConfig;
use grievance_policy::Account;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// API configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field holds a value outside its vocabulary
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Offending field
        field: String,
        /// Offending value
        value: String,
    },
}

/// API configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (default: 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// JWT secret for signing tokens
    pub jwt_secret: String,

    /// Token expiry in seconds (default: 86400 = 1 day)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// SQLite database file (":memory:" for a throwaway store)
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Classification pipeline settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Hosted model settings
    #[serde(default)]
    pub llm: GroqConfig,

    /// bcrypt cost for passwords set at registration (default: 12)
    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,

    /// Provisioned accounts; everyone else registers as a citizen
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// A provisioned account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Subject identifier
    pub subject_id: String,

    /// Highest role: "citizen", "admin" or "superadmin"
    pub role: String,

    /// Department labels the account may administer
    #[serde(default)]
    pub departments: Vec<String>,

    /// bcrypt hash of the account password
    pub password_hash: String,
}

impl AccountConfig {
    /// Convert to the account the login rules operate on
    pub fn to_account(&self) -> Result<Account, ConfigError> {
        let role = Role::parse(&self.role).ok_or_else(|| ConfigError::InvalidValue {
            field: format!("accounts.{}.role", self.subject_id),
            value: self.role.clone(),
        })?;

        let departments = self
            .departments
            .iter()
            .map(|d| {
                DepartmentId::parse(d).ok_or_else(|| ConfigError::InvalidValue {
                    field: format!("accounts.{}.departments", self.subject_id),
                    value: d.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Account::new(self.subject_id.clone(), role, departments))
    }

    /// Convert to the account plus the credential it signs in with
    pub fn to_provisioned(&self) -> Result<ProvisionedAccount, ConfigError> {
        if !is_bcrypt_hash(&self.password_hash) {
            return Err(ConfigError::InvalidValue {
                field: format!("accounts.{}.password_hash", self.subject_id),
                value: "not a bcrypt hash".to_string(),
            });
        }

        Ok(ProvisionedAccount {
            account: self.to_account()?,
            password_hash: self.password_hash.clone(),
        })
    }
}

fn default_bind_port() -> u16 {
    8000
}

/// Default token expiry: 1 day
fn default_token_expiry() -> u64 {
    86_400
}

fn default_database_path() -> String {
    "grievances.db".to_string()
}

fn default_password_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ApiConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig = toml::from_str(contents)?;

        // Validate required fields
        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }
        config
            .classifier
            .validate()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "classifier".to_string(),
                value: reason,
            })?;
        if !(4..=31).contains(&config.password_hash_cost) {
            return Err(ConfigError::InvalidValue {
                field: "password_hash_cost".to_string(),
                value: config.password_hash_cost.to_string(),
            });
        }
        config.account_directory()?;

        Ok(config)
    }

    /// Create a default configuration for testing
    ///
    /// No accounts are provisioned, so only registered citizens can sign in.
    pub fn default_test_config() -> Self {
        ApiConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            jwt_secret: "test-secret-key-do-not-use-in-production".to_string(),
            token_expiry_secs: 86_400,
            database_path: ":memory:".to_string(),
            classifier: ClassifierConfig::default(),
            llm: GroqConfig::default(),
            password_hash_cost: 4,
            accounts: Vec::new(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Provisioned accounts with their credentials
    pub fn account_directory(&self) -> Result<AccountDirectory, ConfigError> {
        let accounts = self
            .accounts
            .iter()
            .map(AccountConfig::to_provisioned)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AccountDirectory::new(accounts, self.password_hash_cost))
    }
}
