//! Structural conformance checks for response bodies
//!
//! Each [`FieldAssertion`] is checked against the response body independently.
//! Every assertion that does not hold yields exactly one [`FieldViolation`]
//! describing the path, what was declared, and what was found.

use regex::Regex;
use serde_json::Value;

use crate::core::{FieldAssertion, FieldCheck, FieldViolation, ValueKind};

use super::Verdict;
use super::path::{count_at, resolve_path};

/// Walk every field assertion and collect violations
pub fn evaluate_fields(body: &Value, assertions: &[FieldAssertion]) -> Verdict {
    let violations: Vec<FieldViolation> = assertions
        .iter()
        .filter_map(|assertion| check_field(body, assertion))
        .collect();

    let mut verdict = if violations.is_empty() {
        Verdict::pass()
    } else {
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        Verdict::fail(format!(
            "{} field assertion(s) failed: {}",
            violations.len(),
            paths.join(", ")
        ))
    };
    verdict.validation_errors = violations;
    verdict
}

/// Check a single assertion, returning the violation if it does not hold
pub fn check_field(body: &Value, assertion: &FieldAssertion) -> Option<FieldViolation> {
    let path = assertion.path.as_str();
    // FHIR JSON never carries explicit nulls, so a null counts as absent
    let found = resolve_path(body, path).filter(|v| !v.is_null());

    match &assertion.check {
        FieldCheck::Present { kind } => {
            let expected = Value::String(
                kind.map(|k| k.as_str().to_string())
                    .unwrap_or_else(|| "present".to_string()),
            );
            match (found, kind) {
                (None, _) => Some(violation(path, expected, None)),
                (Some(value), Some(kind)) if ValueKind::of(value) != *kind => Some(violation(
                    path,
                    expected,
                    Some(Value::String(ValueKind::of(value).to_string())),
                )),
                _ => None,
            }
        }
        FieldCheck::Equals { value } => match found {
            Some(actual) if actual == value => None,
            actual => Some(violation(path, value.clone(), actual.cloned())),
        },
        FieldCheck::Matches { pattern } => {
            let expected = Value::String(pattern.clone());
            let regex = match Regex::new(pattern) {
                Ok(regex) => regex,
                Err(e) => {
                    return Some(violation(
                        path,
                        expected,
                        Some(Value::String(format!("invalid pattern: {e}"))),
                    ));
                }
            };

            match found {
                None => Some(violation(path, expected, None)),
                Some(actual) => match scalar_text(actual) {
                    Some(text) if regex.is_match(&text) => None,
                    _ => Some(violation(path, expected, Some(actual.clone()))),
                },
            }
        }
        FieldCheck::Cardinality { min, max } => {
            let count = count_at(body, path);
            let within = count >= *min && max.is_none_or(|max| count <= max);
            if within {
                None
            } else {
                let upper = max.map_or_else(|| "*".to_string(), |m| m.to_string());
                Some(violation(
                    path,
                    Value::String(format!("{min}..{upper}")),
                    Some(Value::from(count)),
                ))
            }
        }
    }
}

fn violation(path: &str, expected: Value, actual: Option<Value>) -> FieldViolation {
    FieldViolation {
        path: path.to_string(),
        expected,
        actual,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
