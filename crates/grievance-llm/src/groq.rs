//! Groq Provider Implementation
//!
//! Talks to Groq's OpenAI-compatible chat-completions endpoint. One request
//! per call: no retries, no backoff. The caller decides what a failure means.
//!
//! # Examples
//!
//! ```no_run
//! use grievance_llm::{GroqConfig, GroqProvider};
//!
//! let config = GroqConfig {
//!     api_key: "gsk_...".to_string(),
//!     ..GroqConfig::default()
//! };
//! let provider = GroqProvider::from_config(&config);
//! assert!(provider.is_some());
//! ```

use crate::LlmError;
use grievance_domain::traits::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Groq API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Environment variable consulted when the configured key is empty
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Connection settings for the hosted model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key; empty means "not configured"
    pub api_key: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
        }
    }
}

impl GroqConfig {
    /// Fill an empty key from the `GROQ_API_KEY` environment variable
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.api_key = key;
            }
        }
        self
    }

    /// Whether a credential is present
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Groq chat-completions provider
#[derive(Debug, Clone)]
pub struct GroqProvider {
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqProvider {
    /// Create a provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://api.groq.com/openai/v1")
    /// - `model`: Model to use (e.g., "llama-3.1-8b-instant")
    /// - `api_key`: Bearer credential
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a provider from configuration; `None` when no key is configured
    pub fn from_config(config: &GroqConfig) -> Option<Self> {
        if !config.has_credential() {
            return None;
        }
        Some(Self::new(&config.endpoint, &config.model, config.api_key.trim()))
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn send(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);

        // The blocking client owns a private runtime, so it is built on the
        // calling (blocking) thread rather than kept inside async state.
        let client = reqwest::blocking::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        };

        let response = client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No completion choices".to_string()))?;

        debug!("Model returned {} chars", content.len());
        Ok(content)
    }
}

fn classify_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}

impl CompletionProvider for GroqProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_provider_creation() {
        let provider = GroqProvider::new("http://localhost:8080/v1/", "llama", "key");
        assert_eq!(provider.endpoint, "http://localhost:8080/v1");
        assert_eq!(provider.model(), "llama");
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(GroqProvider::from_config(&GroqConfig::default()).is_none());

        let config = GroqConfig {
            api_key: "   ".to_string(),
            ..GroqConfig::default()
        };
        assert!(GroqProvider::from_config(&config).is_none());

        let config = GroqConfig {
            api_key: "gsk_test".to_string(),
            ..GroqConfig::default()
        };
        let provider = GroqProvider::from_config(&config).unwrap();
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_unreachable_endpoint_errors() {
        // Port 9 (discard) on loopback is expected to refuse connections
        let provider = GroqProvider::new("http://127.0.0.1:9", "llama", "key");
        let request = CompletionRequest {
            system: "s".to_string(),
            user: "u".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(2),
        };

        let result = provider.complete(&request);
        assert!(matches!(
            result,
            Err(LlmError::Communication(_)) | Err(LlmError::Timeout)
        ));
    }
}
