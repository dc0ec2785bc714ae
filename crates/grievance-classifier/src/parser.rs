//! Parse model output into a validated verdict
//!
//! Models do not always follow "JSON only". Extraction tries, in order:
//!
//! 1. the whole trimmed response as one JSON object
//! 2. the contents of the first fenced code block
//! 3. each innermost `{...}` span that mentions `"department"`
//!
//! The first span that parses as a JSON object is validated; if that fails
//! the response is unusable.

use crate::error::ParseError;
use grievance_domain::{ClassificationVerdict, DepartmentId, Priority, FALLBACK_PREFIX};
use serde_json::{Map, Value};

const REQUIRED_KEYS: [&str; 4] = ["department", "priority", "confidence", "explanation"];
const DEPARTMENT_KEY: &str = "\"department\"";
const FENCE: &str = "```";

/// Parse a raw model response into a verdict
pub fn parse_model_response(response: &str) -> Result<ClassificationVerdict, ParseError> {
    let object = extract_json_object(response).ok_or(ParseError::NoJsonObject)?;
    validate_object(&object)
}

/// Serialize a verdict to the object shape the parser accepts
pub fn render_verdict(verdict: &ClassificationVerdict) -> String {
    serde_json::json!({
        "department": verdict.department().as_str(),
        "priority": verdict.priority().as_str(),
        "confidence": verdict.confidence(),
        "explanation": verdict.explanation(),
    })
    .to_string()
}

/// Run the extraction strategies in priority order
fn extract_json_object(response: &str) -> Option<Map<String, Value>> {
    let trimmed = response.trim();

    if let Some(object) = parse_object(trimmed) {
        return Some(object);
    }

    if let Some(object) = fenced_block(trimmed).and_then(parse_object) {
        return Some(object);
    }

    department_spans(trimmed).find_map(parse_object)
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Contents of the first ``` fenced block, without its language tag
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find(FENCE)? + FENCE.len();
    let rest = &text[open..];
    let close = rest.find(FENCE)?;
    let body = &rest[..close];

    // Drop an info string such as "json" on the opening line
    let body = match body.split_once('\n') {
        Some((tag, remainder)) if is_info_string(tag) => remainder,
        _ => body.strip_prefix("json").unwrap_or(body),
    };

    Some(body.trim())
}

fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Innermost brace-delimited spans that contain the department key
///
/// A span qualifies when no other brace sits between its delimiters and the
/// key, mirroring a `\{[^{}]*"department"[^{}]*\}` match.
fn department_spans(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();

    text.match_indices(DEPARTMENT_KEY).filter_map(move |(idx, _)| {
        let start = bytes[..idx]
            .iter()
            .rposition(|&b| b == b'{' || b == b'}')
            .filter(|&pos| bytes[pos] == b'{')?;

        let after = idx + DEPARTMENT_KEY.len();
        let end = bytes[after..]
            .iter()
            .position(|&b| b == b'{' || b == b'}')
            .map(|offset| after + offset)
            .filter(|&pos| bytes[pos] == b'}')?;

        // Braces are ASCII, so these byte offsets are char boundaries
        Some(&text[start..=end])
    })
}

/// Check keys and closed vocabularies, then build the verdict
fn validate_object(object: &Map<String, Value>) -> Result<ClassificationVerdict, ParseError> {
    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(ParseError::MissingKey(key));
        }
    }

    let department = string_field(object, "department")?;
    let department = DepartmentId::parse(department.trim())
        .ok_or_else(|| ParseError::UnknownDepartment(department.to_string()))?;

    let priority = string_field(object, "priority")?;
    let priority = Priority::parse(priority.trim())
        .ok_or_else(|| ParseError::UnknownPriority(priority.to_string()))?;

    let confidence = coerce_confidence(&object["confidence"])?;
    let explanation = string_field(object, "explanation")?;
    // Only keyword verdicts may read as fallback ones
    if explanation.trim_start().starts_with(FALLBACK_PREFIX) {
        return Err(ParseError::ReservedExplanation);
    }

    ClassificationVerdict::new(department, priority, confidence, explanation)
        .map_err(|e| ParseError::InvalidConfidence(e.to_string()))
}

fn string_field<'a>(
    object: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ParseError> {
    object[key].as_str().ok_or(ParseError::WrongType(key))
}

/// Accept a JSON number or a numeric string
fn coerce_confidence(value: &Value) -> Result<f64, ParseError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ParseError::InvalidConfidence(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidConfidence(s.clone())),
        other => Err(ParseError::InvalidConfidence(other.to_string())),
    }
}
