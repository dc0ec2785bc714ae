//! Prompt construction for the model call

use crate::config::ClassifierConfig;
use grievance_domain::traits::CompletionRequest;
use grievance_domain::DepartmentId;

/// Sampling temperature for every classification call
pub const TEMPERATURE: f32 = 0.0;

/// Builds the fixed system instruction and the per-grievance request
pub struct PromptBuilder<'a> {
    config: &'a ClassifierConfig,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for a configuration
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self { config }
    }

    /// Build the completion request; the message is the sole user content
    pub fn build(&self, message: &str) -> CompletionRequest {
        CompletionRequest {
            system: system_instruction(),
            user: message.to_string(),
            temperature: TEMPERATURE,
            timeout: self.config.timeout(),
        }
    }
}

/// The system instruction, with the department vocabulary spelled out
///
/// The label list is generated from [`DepartmentId::ALL`] so the prompt and
/// the validator can never disagree.
pub fn system_instruction() -> String {
    let departments: Vec<&str> = DepartmentId::ALL.iter().map(|d| d.as_str()).collect();

    let mut prompt = String::new();
    prompt.push_str(CLASSIFIER_ROLE);
    prompt.push_str("\n\n");
    prompt.push_str("Output exactly one JSON object with these keys and nothing else:\n");
    prompt.push_str(&format!(
        "{{\"department\":\"<one of: {}>\",\"priority\":\"<high|medium|low>\",\"confidence\":<number 0.0-1.0>,\"explanation\":\"<one sentence>\"}}\n\n",
        departments.join(",")
    ));
    prompt.push_str(CLASSIFICATION_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(FEW_SHOT_EXAMPLES);
    prompt
}

const CLASSIFIER_ROLE: &str =
    "You are an automated municipal grievance classifier. Read the citizen's complaint and route it to exactly one department.";

const CLASSIFICATION_RULES: &str = r#"Rules:
- Choose one primary department only.
- priority: high = imminent danger, public safety or major outage; medium = service-impacting; low = cosmetic or affects a single household.
- confidence is a number between 0.0 and 1.0.
- The output must be parseable as JSON: no markdown, no code fences, no text before or after the object."#;

const FEW_SHOT_EXAMPLES: &str = r#"Examples:
Complaint: "Water main burst on Main St, houses flooded."
Answer: {"department":"water","priority":"high","confidence":0.95,"explanation":"burst main flooding homes is an emergency for the water department"}
Complaint: "Streetlights off on Elm Road every night for 2 weeks."
Answer: {"department":"electricity","priority":"medium","confidence":0.88,"explanation":"prolonged streetlight outage affecting night safety"}
Complaint: "Trash not collected in Sector 5, rats observed."
Answer: {"department":"sanitation","priority":"medium","confidence":0.86,"explanation":"missed collection causing a public health risk"}"#;
