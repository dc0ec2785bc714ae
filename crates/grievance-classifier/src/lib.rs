//! Grievance Classifier
//!
//! Turns free-text complaints into a validated
//! (department, priority, confidence, explanation) verdict.
//!
//! # Architecture
//!
//! ```text
//! message → PromptBuilder → CompletionProvider (timeout) → parser → Accepted
//!                 │                    │                      │
//!                 └── no provider ─────┴── error / timeout ───┴── invalid → RuleFallbackClassifier → Fallback
//! ```
//!
//! Every path ends in a verdict whose department is one of the closed labels
//! and whose confidence is within [0, 1].
//!
//! # Example Usage
//!
//! ```no_run
//! use grievance_classifier::{ClassificationPipeline, ClassifierConfig};
//! use grievance_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new("not json");
//! let pipeline = ClassificationPipeline::new(provider, ClassifierConfig::default())?;
//!
//! let outcome = pipeline.classify("Water main burst on Main St, houses flooded").await;
//! println!("{} ({})", outcome.verdict().department(), outcome.verdict().explanation());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fallback;
mod parser;
mod pipeline;
mod prompt;
mod types;


pub use config::{ClassifierConfig, DEFAULT_TIMEOUT_MS};
pub use error::{ClassifierError, ParseError};
pub use fallback::{
    KeywordRule, RuleFallbackClassifier, DEFAULT_CONFIDENCE, KEYWORD_MATCH_CONFIDENCE, RULES,
};
pub use parser::{parse_model_response, render_verdict};
pub use pipeline::ClassificationPipeline;
pub use prompt::{system_instruction, PromptBuilder};
pub use types::{ClassificationOutcome, DegradedReason};
