//! Grievance LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `grievance-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GroqProvider`: Hosted OpenAI-compatible chat-completions API
//!
//! # Examples
//!
//! ```
//! use grievance_llm::MockProvider;
//! use grievance_domain::traits::{CompletionProvider, CompletionRequest};
//! use std::time::Duration;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let request = CompletionRequest {
//!     system: "sys".to_string(),
//!     user: "hi".to_string(),
//!     temperature: 0.0,
//!     timeout: Duration::from_secs(1),
//! };
//! assert_eq!(provider.complete(&request).unwrap(), "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod groq;

use grievance_domain::traits::{CompletionProvider, CompletionRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use groq::{GroqConfig, GroqProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The call exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// Invalid response envelope from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses keyed by the user content, without any
/// network calls. Clones share responses, counters and the recorded request.
///
/// # Examples
///
/// ```
/// use grievance_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("pipe burst", r#"{"department":"water"}"#);
/// provider.add_error("broken");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Option<String>>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
    delay: Option<Duration>,
    fail_all: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all inputs
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            delay: None,
            fail_all: false,
        }
    }

    /// Create a provider whose every call fails, like an unreachable service
    pub fn unreachable() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Sleep before answering (simulates a slow service)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given user content
    pub fn add_response(&mut self, user: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(user.into(), Some(response.into()));
    }

    /// Configure to return an error for a specific user content
    pub fn add_error(&mut self, user: impl Into<String>) {
        lock(&self.responses).insert(user.into(), None);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// The most recent request seen
    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.last_request).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_request) = Some(request.clone());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if self.fail_all {
            return Err(LlmError::Communication("connection refused".to_string()));
        }

        match lock(&self.responses).get(&request.user) {
            Some(Some(response)) => Ok(response.clone()),
            Some(None) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest {
            system: "classify".to_string(),
            user: user.to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("any text"));
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&request("hello")).unwrap(), "world");
        assert_eq!(provider.complete(&request("foo")).unwrap(), "bar");
        assert_eq!(
            provider.complete(&request("unknown")).unwrap(),
            "Default mock response"
        );
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("a")).unwrap();
        provider.complete(&request("b")).unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad input");

        let result = provider.complete(&request("bad input"));
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[test]
    fn test_unreachable_provider_always_fails() {
        let provider = MockProvider::unreachable();
        assert!(matches!(
            provider.complete(&request("x")),
            Err(LlmError::Communication(_))
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_mock_provider_records_request() {
        let provider = MockProvider::new("ok");
        let clone = provider.clone();

        provider.complete(&request("pipe burst")).unwrap();

        // Clones share state
        let seen = clone.last_request().unwrap();
        assert_eq!(seen.user, "pipe burst");
        assert_eq!(seen.temperature, 0.0);
        assert_eq!(clone.call_count(), 1);
    }
}
