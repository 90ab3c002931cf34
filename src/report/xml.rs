use serde::Serialize;

use super::{ReportDocument, ReportSummary};
use crate::core::TestResult;
use crate::error::{FhirTestError, Result};

#[derive(Serialize)]
struct XmlReport<'a> {
    #[serde(rename = "@generatedAt")]
    generated_at: String,
    summary: &'a ReportSummary,
    #[serde(rename = "test", skip_serializing_if = "Vec::is_empty")]
    tests: Vec<XmlTest>,
}

#[derive(Serialize)]
struct XmlTest {
    #[serde(rename = "@id")]
    id: String,
    name: String,
    status: String,
    #[serde(rename = "executionTime")]
    execution_time: u64,
    timestamp: String,
    #[serde(rename = "result", skip_serializing_if = "Vec::is_empty")]
    results: Vec<XmlResult>,
}

#[derive(Serialize)]
struct XmlResult {
    #[serde(rename = "@runId")]
    run_id: String,
    status: String,
    #[serde(rename = "executionTime")]
    execution_time: u64,
    timestamp: String,
    #[serde(rename = "failureReason", skip_serializing_if = "Option::is_none")]
    failure_reason: Option<String>,
    #[serde(rename = "validationError", skip_serializing_if = "Vec::is_empty")]
    validation_errors: Vec<XmlViolation>,
    #[serde(rename = "performanceMetric", skip_serializing_if = "Vec::is_empty")]
    performance_metrics: Vec<XmlMetric>,
}

#[derive(Serialize)]
struct XmlViolation {
    path: String,
    expected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<String>,
}

#[derive(Serialize)]
struct XmlMetric {
    #[serde(rename = "@name")]
    metric: String,
    value: f64,
    unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
    passed: bool,
}

impl From<&TestResult> for XmlResult {
    fn from(result: &TestResult) -> Self {
        let details = &result.details;
        Self {
            run_id: result.run_id.to_string(),
            status: result.status.to_string(),
            execution_time: result.execution_time,
            timestamp: result.timestamp.to_rfc3339(),
            failure_reason: details.failure_reason.clone(),
            validation_errors: details
                .validation_errors
                .iter()
                .map(|v| XmlViolation {
                    path: v.path.clone(),
                    expected: scalar_or_json(&v.expected),
                    actual: v.actual.as_ref().map(scalar_or_json),
                })
                .collect(),
            performance_metrics: details
                .performance_metrics
                .iter()
                .map(|m| XmlMetric {
                    metric: m.metric.clone(),
                    value: m.value,
                    unit: m.unit.clone(),
                    threshold: m.threshold,
                    passed: m.passed,
                })
                .collect(),
        }
    }
}

fn scalar_or_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the document as an XML interchange file
pub(super) fn render(document: &ReportDocument) -> Result<String> {
    let report = XmlReport {
        generated_at: document.generated_at.to_rfc3339(),
        summary: &document.summary,
        tests: document
            .tests
            .iter()
            .map(|entry| XmlTest {
                id: entry.id.clone(),
                name: entry.name.clone(),
                status: entry.status.to_string(),
                execution_time: entry.execution_time,
                timestamp: entry.timestamp.to_rfc3339(),
                results: entry.results.iter().map(XmlResult::from).collect(),
            })
            .collect(),
    };

    let body = quick_xml::se::to_string_with_root("testReport", &report).map_err(|e| {
        FhirTestError::Report {
            message: format!("XML serialization failed: {e}"),
        }
    })?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"))
}
