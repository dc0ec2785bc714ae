//! Classification pipeline: one bounded model call, then parse, validate,
//! or fall back

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::fallback::RuleFallbackClassifier;
use crate::parser::parse_model_response;
use crate::prompt::PromptBuilder;
use crate::types::{ClassificationOutcome, DegradedReason};
use grievance_domain::traits::{CompletionProvider, CompletionRequest};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns grievance text into a verdict; never fails
///
/// The provider is optional: without one every message goes straight to the
/// keyword fallback. There are no retries; a single failure falls back so
/// submission latency stays bounded by the configured timeout.
pub struct ClassificationPipeline<P> {
    provider: Option<Arc<P>>,
    config: ClassifierConfig,
    fallback: RuleFallbackClassifier,
}

impl<P> ClassificationPipeline<P>
where
    P: CompletionProvider + Send + Sync + 'static,
    P::Error: std::fmt::Display,
{
    /// Create a pipeline that calls `provider`
    pub fn new(provider: P, config: ClassifierConfig) -> Result<Self, ClassifierError> {
        Self::with_optional_provider(Some(provider), config)
    }

    /// Create a pipeline that only uses the keyword fallback
    pub fn fallback_only(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        Self::with_optional_provider(None, config)
    }

    /// Create a pipeline from an optional provider
    pub fn with_optional_provider(
        provider: Option<P>,
        config: ClassifierConfig,
    ) -> Result<Self, ClassifierError> {
        config.validate().map_err(ClassifierError::Config)?;

        Ok(Self {
            provider: provider.map(Arc::new),
            config,
            fallback: RuleFallbackClassifier::new(),
        })
    }

    /// Whether a model provider is configured
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Active configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a message (length already validated by the caller)
    pub async fn classify(&self, message: &str) -> ClassificationOutcome {
        match self.try_model(message).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!("Classification degraded to keyword fallback: {}", reason);
                ClassificationOutcome::Fallback {
                    verdict: self.fallback.classify(message),
                    reason,
                }
            }
        }
    }

    async fn try_model(&self, message: &str) -> Result<ClassificationOutcome, DegradedReason> {
        let provider = self.provider.as_ref().ok_or(DegradedReason::NoProvider)?;

        let request = PromptBuilder::new(&self.config).build(message);
        debug!(
            "Classifying message of {} chars (prompt {} chars)",
            message.chars().count(),
            request.system.chars().count()
        );

        let response = self.invoke(Arc::clone(provider), request).await?;
        debug!("Model response length: {} bytes", response.len());

        let verdict = parse_model_response(&response).map_err(|e| {
            debug!("Unusable model response: {:.200}", response);
            DegradedReason::Malformed(e)
        })?;

        info!(
            "Model classified grievance as {} ({}, {:.2})",
            verdict.department(),
            verdict.priority(),
            verdict.confidence()
        );
        Ok(ClassificationOutcome::Accepted(verdict))
    }

    /// One provider call on the blocking pool, bounded by the timeout
    async fn invoke(
        &self,
        provider: Arc<P>,
        request: CompletionRequest,
    ) -> Result<String, DegradedReason> {
        // CompletionProvider is not async
        let call = tokio::task::spawn_blocking(move || {
            provider.complete(&request).map_err(|e| e.to_string())
        });

        match timeout(self.config.timeout(), call).await {
            Err(_) => Err(DegradedReason::Timeout),
            Ok(Err(join_error)) => Err(DegradedReason::Provider(format!(
                "Task join error: {}",
                join_error
            ))),
            Ok(Ok(result)) => result.map_err(DegradedReason::Provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use grievance_domain::{DepartmentId, Priority};
    use grievance_llm::MockProvider;
    use std::time::Duration;

    const MODEL_VERDICT: &str = r#"{"department":"electricity","priority":"high","confidence":0.91,"explanation":"substation fire"}"#;

    fn pipeline(provider: MockProvider) -> ClassificationPipeline<MockProvider> {
        ClassificationPipeline::new(provider, ClassifierConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_model_output() {
        let outcome = pipeline(MockProvider::new(MODEL_VERDICT))
            .classify("Substation on fire, whole block dark")
            .await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.verdict().department(), DepartmentId::Electricity);
        assert_eq!(outcome.verdict().priority(), Priority::High);
        assert!(!outcome.verdict().is_fallback());
    }

    #[tokio::test]
    async fn test_sends_one_deterministic_request() {
        let provider = MockProvider::new(MODEL_VERDICT);
        let p = pipeline(provider.clone());

        p.classify("Substation on fire, whole block dark").await;

        assert_eq!(provider.call_count(), 1);
        let request = provider.last_request().unwrap();
        assert_eq!(request.user, "Substation on fire, whole block dark");
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_no_provider_falls_back_without_calling() {
        let p = ClassificationPipeline::<MockProvider>::fallback_only(ClassifierConfig::default())
            .unwrap();
        assert!(!p.has_provider());

        let outcome = p.classify("Pothole swallowed my bicycle wheel").await;
        assert_eq!(outcome.degraded_reason(), Some(&DegradedReason::NoProvider));
        assert_eq!(outcome.verdict().department(), DepartmentId::Roads);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back_once() {
        let provider = MockProvider::unreachable();
        let p = pipeline(provider.clone());

        let outcome = p.classify("Garbage not collected for a week").await;

        assert!(matches!(
            outcome.degraded_reason(),
            Some(DegradedReason::Provider(_))
        ));
        assert_eq!(outcome.verdict().department(), DepartmentId::Sanitation);
        // No retries
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_garbage_output_falls_back() {
        let outcome = pipeline(MockProvider::new("As an AI, I think it is roads."))
            .classify("Pothole swallowed my bicycle wheel")
            .await;

        assert_eq!(
            outcome.degraded_reason(),
            Some(&DegradedReason::Malformed(ParseError::NoJsonObject))
        );
        assert!(outcome.verdict().is_fallback());
    }

    #[tokio::test]
    async fn test_invalid_label_falls_back() {
        let response = r#"{"department":"fire","priority":"high","confidence":0.9,"explanation":"x"}"#;
        let outcome = pipeline(MockProvider::new(response))
            .classify("Ambulance took an hour to arrive")
            .await;

        assert!(matches!(
            outcome.degraded_reason(),
            Some(DegradedReason::Malformed(ParseError::UnknownDepartment(_)))
        ));
        assert_eq!(outcome.verdict().department(), DepartmentId::Health);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let provider = MockProvider::new(MODEL_VERDICT).with_delay(Duration::from_millis(400));
        let config = ClassifierConfig {
            timeout_ms: 50,
            ..ClassifierConfig::default()
        };
        let p = ClassificationPipeline::new(provider, config).unwrap();

        let outcome = p.classify("Water main burst on Main St, houses flooded").await;

        assert_eq!(outcome.degraded_reason(), Some(&DegradedReason::Timeout));
        assert_eq!(outcome.verdict().department(), DepartmentId::Water);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClassifierConfig {
            timeout_ms: 0,
            ..ClassifierConfig::default()
        };
        assert!(ClassificationPipeline::new(MockProvider::default(), config).is_err());
    }
}
