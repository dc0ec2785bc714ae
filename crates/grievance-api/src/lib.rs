//! Grievance API
//!
//! HTTP service for filing, classifying and triaging municipal grievances.
//! Sessions are JWT bearer tokens carrying the principal chosen at login.
//! A token is only issued after the subject's password checks out.

#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod handlers;
pub mod session;

use config::ApiConfig;
use grievance_classifier::{ClassificationPipeline, ClassifierError};
use grievance_llm::GroqProvider;
use grievance_store::{SqliteStore, StoreError};
use handlers::{create_router, AppState};
use session::SessionManager;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Classifier could not be configured
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Storage could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application state from configuration
///
/// An empty model key falls back to the `GROQ_API_KEY` environment variable;
/// with neither, every grievance is classified by the keyword rules.
pub fn build_state(config: &ApiConfig) -> Result<AppState, ServerError> {
    let llm = config.llm.clone().with_env_fallback();
    let provider = GroqProvider::from_config(&llm);
    match &provider {
        Some(p) => info!("Classifying with model {}", p.model()),
        None => warn!("No model API key configured; classifying with keyword rules only"),
    }

    let pipeline =
        ClassificationPipeline::with_optional_provider(provider, config.classifier.clone())?;
    let store = SqliteStore::new(&config.database_path)?;
    let session_manager = SessionManager::new(&config.jwt_secret, config.token_expiry_secs);

    Ok(AppState::new(
        session_manager,
        pipeline,
        store,
        config.account_directory()?,
    ))
}

/// Start the API HTTP server
///
/// Installs logging, builds state from configuration, and serves until the
/// listener fails.
pub async fn start_server(config: ApiConfig) -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Grievance API");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Token expiry: {} seconds", config.token_expiry_secs);
    info!("Provisioned accounts: {}", config.accounts.len());

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("API listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
