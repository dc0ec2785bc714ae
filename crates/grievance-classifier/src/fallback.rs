//! Deterministic keyword classifier used whenever the model cannot be used
//!
//! Rules are evaluated in declaration order and the first rule with any
//! keyword present wins. The order is part of the contract: a message that
//! mentions both a water and a sanitation keyword is always `water`.

use grievance_domain::{ClassificationVerdict, DepartmentId, Priority, FALLBACK_PREFIX};
use std::collections::HashSet;

/// Confidence reported for a keyword match
///
/// Kept below typical model confidence so heuristic verdicts are never
/// mistaken for strong ones downstream.
pub const KEYWORD_MATCH_CONFIDENCE: f64 = 0.55;

/// Confidence reported when no rule matches
pub const DEFAULT_CONFIDENCE: f64 = 0.45;

/// One keyword rule
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    /// Lower-case keywords; any one of them triggers the rule
    pub keywords: &'static [&'static str],
    /// Department assigned on match
    pub department: DepartmentId,
    /// Priority assigned on match
    pub priority: Priority,
}

/// The ordered rule table
pub const RULES: [KeywordRule; 7] = [
    KeywordRule {
        keywords: &["water", "leak", "pipe", "burst", "tap", "supply"],
        department: DepartmentId::Water,
        priority: Priority::Medium,
    },
    KeywordRule {
        keywords: &["garbage", "trash", "waste", "sewage", "sewer", "drain"],
        department: DepartmentId::Sanitation,
        priority: Priority::Medium,
    },
    KeywordRule {
        keywords: &["road", "pothole", "crack", "street", "pavement"],
        department: DepartmentId::Roads,
        priority: Priority::Low,
    },
    KeywordRule {
        keywords: &["power", "electricity", "outage", "streetlight", "lamp"],
        department: DepartmentId::Electricity,
        priority: Priority::Medium,
    },
    KeywordRule {
        keywords: &["hospital", "clinic", "health", "medical", "ambulance"],
        department: DepartmentId::Health,
        priority: Priority::High,
    },
    KeywordRule {
        keywords: &["theft", "robbery", "crime", "police", "safety", "attack"],
        department: DepartmentId::Police,
        priority: Priority::High,
    },
    KeywordRule {
        keywords: &["building", "construction", "house", "apartment", "permit"],
        department: DepartmentId::Housing,
        priority: Priority::Low,
    },
];

/// Rule-based classifier; total and deterministic
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFallbackClassifier;

impl RuleFallbackClassifier {
    /// Create the classifier
    pub fn new() -> Self {
        Self
    }

    /// Classify text; never fails
    pub fn classify(&self, text: &str) -> ClassificationVerdict {
        let tokens = tokenize(text);

        let matched = RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| tokens.contains(*kw)));

        // Constants are in range, so construction cannot fail
        match matched {
            Some(rule) => verdict(
                rule.department,
                rule.priority,
                KEYWORD_MATCH_CONFIDENCE,
                format!("{} matched {} keywords", FALLBACK_PREFIX, rule.department),
            ),
            None => verdict(
                DepartmentId::Miscellaneous,
                Priority::Low,
                DEFAULT_CONFIDENCE,
                format!("{} unclear classification", FALLBACK_PREFIX),
            ),
        }
    }
}

fn verdict(
    department: DepartmentId,
    priority: Priority,
    confidence: f64,
    explanation: String,
) -> ClassificationVerdict {
    ClassificationVerdict::new(department, priority, confidence, explanation)
        .unwrap_or_else(|e| unreachable!("fallback constants out of range: {}", e))
}

/// Lower-cased alphanumeric words
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
