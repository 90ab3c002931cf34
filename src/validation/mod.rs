//! Assertion evaluators
//!
//! Evaluators are pure: they look only at a response and a test case's
//! expectation, never at the network or the result store. Each returns a
//! [`Verdict`]; verdicts are merged and the merged verdict decides whether an
//! execution passed or failed.

pub mod field_validator;
pub mod path;
pub mod performance;
pub mod status;

pub use field_validator::{check_field, evaluate_fields};
pub use path::{count_at, resolve_path};
pub use performance::{Measurements, evaluate_performance};
pub use status::evaluate_status;

use crate::client::ClientResponse;
use crate::core::{Expectation, FieldViolation, PerformanceMetric, TestDetails};

/// Outcome contributed by one or more evaluators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    /// Human readable reasons, one per failing evaluator
    pub failures: Vec<String>,
    pub validation_errors: Vec<FieldViolation>,
    pub performance_metrics: Vec<PerformanceMetric>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            failures: vec![reason.into()],
            ..Default::default()
        }
    }

    pub fn is_passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_reason(&self) -> Option<String> {
        if self.failures.is_empty() {
            None
        } else {
            Some(self.failures.join("; "))
        }
    }

    /// Merge another verdict into this one
    pub fn merge(&mut self, other: Verdict) {
        self.failures.extend(other.failures);
        self.validation_errors.extend(other.validation_errors);
        self.performance_metrics.extend(other.performance_metrics);
    }

    pub fn into_details(self) -> TestDetails {
        TestDetails {
            failure_reason: self.failure_reason(),
            validation_errors: self.validation_errors,
            performance_metrics: self.performance_metrics,
        }
    }
}

/// Run every applicable evaluator for a well-formed response.
///
/// The status evaluator always runs; the structural evaluator runs when field
/// assertions are declared and the performance evaluator when thresholds are.
pub fn evaluate(response: &ClientResponse, response_time_ms: u64, expectation: &Expectation) -> Verdict {
    let mut verdict = evaluate_status(response.status, &expectation.status);

    if !expectation.fields.is_empty() {
        verdict.merge(evaluate_fields(&response.body, &expectation.fields));
    }

    if !expectation.performance.is_empty() {
        let measurements = Measurements::new(response_time_ms, &response.body, response.size_bytes);
        verdict.merge(evaluate_performance(&measurements, &expectation.performance));
    }

    verdict
}
