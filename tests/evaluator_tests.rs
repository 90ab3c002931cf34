// Assertion evaluator behaviour over realistic FHIR payloads

use serde_json::json;

use octofhir_fhirtest::validation::{
    Measurements, evaluate_fields, evaluate_performance, evaluate_status, resolve_path,
};
use octofhir_fhirtest::{
    ClientResponse, Expectation, FieldAssertion, MetricKind, MetricThreshold, StatusExpectation,
    ValueKind, evaluate,
};

fn response_time(max: f64) -> Vec<MetricThreshold> {
    vec![MetricThreshold {
        metric: MetricKind::ResponseTime,
        threshold: max,
    }]
}

#[test]
fn test_missing_subject_reference_yields_single_violation() {
    let encounter = json!({
        "resourceType": "Encounter",
        "id": "enc-1",
        "status": "finished",
        "subject": {"display": "Peter Chalmers"}
    });

    let verdict = evaluate_fields(
        &encounter,
        &[
            FieldAssertion::equals("resourceType", "Encounter"),
            FieldAssertion::present_as("subject.reference", ValueKind::String),
        ],
    );

    assert!(!verdict.is_passed());
    assert_eq!(verdict.validation_errors.len(), 1);

    let violation = &verdict.validation_errors[0];
    assert_eq!(violation.path, "subject.reference");
    assert_eq!(violation.expected, json!("string"));
    assert_eq!(violation.actual, None);
}

#[test]
fn test_type_mismatch_reports_found_kind() {
    let body = json!({"subject": {"reference": 42}});

    let verdict = evaluate_fields(
        &body,
        &[FieldAssertion::present_as("subject.reference", ValueKind::String)],
    );

    assert_eq!(verdict.validation_errors.len(), 1);
    assert_eq!(verdict.validation_errors[0].actual, Some(json!("number")));
}

#[test]
fn test_equals_and_matches() {
    let capability = json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "fhirVersion": "4.0.1"
    });

    let verdict = evaluate_fields(
        &capability,
        &[
            FieldAssertion::equals("resourceType", "CapabilityStatement"),
            FieldAssertion::matches("status", "^(draft|active|retired|unknown)$"),
            FieldAssertion::matches("fhirVersion", r"^4\.0\.\d+$"),
        ],
    );
    assert!(verdict.is_passed());
    assert!(verdict.validation_errors.is_empty());

    let verdict = evaluate_fields(
        &capability,
        &[
            FieldAssertion::equals("resourceType", "Bundle"),
            FieldAssertion::matches("fhirVersion", r"^5\."),
        ],
    );
    assert_eq!(verdict.validation_errors.len(), 2);
    assert_eq!(
        verdict.validation_errors[0].actual,
        Some(json!("CapabilityStatement"))
    );
    assert_eq!(verdict.validation_errors[1].actual, Some(json!("4.0.1")));
    assert!(
        verdict
            .failure_reason()
            .unwrap()
            .contains("resourceType, fhirVersion")
    );
}

#[test]
fn test_invalid_pattern_is_a_violation_not_a_panic() {
    let body = json!({"status": "active"});
    let verdict = evaluate_fields(&body, &[FieldAssertion::matches("status", "([")]);

    assert!(!verdict.is_passed());
    assert_eq!(verdict.validation_errors.len(), 1);
}

#[test]
fn test_cardinality_over_bundle_entries() {
    let bundle = json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "entry": [
            {"resource": {"resourceType": "Patient", "id": "1"}},
            {"resource": {"resourceType": "Patient", "id": "2"}},
            {"resource": {"resourceType": "Patient", "id": "3"}}
        ]
    });

    assert!(evaluate_fields(&bundle, &[FieldAssertion::cardinality("entry", 1, Some(5))]).is_passed());

    let verdict = evaluate_fields(&bundle, &[FieldAssertion::cardinality("entry", 0, Some(2))]);
    assert_eq!(verdict.validation_errors.len(), 1);
    assert_eq!(verdict.validation_errors[0].expected, json!("0..2"));
    assert_eq!(verdict.validation_errors[0].actual, Some(json!(3)));
}

#[test]
fn test_absent_array_counts_as_zero() {
    let empty_bundle = json!({"resourceType": "Bundle", "type": "searchset", "total": 0});

    assert!(
        evaluate_fields(&empty_bundle, &[FieldAssertion::cardinality("entry", 0, None)]).is_passed()
    );

    let verdict = evaluate_fields(&empty_bundle, &[FieldAssertion::cardinality("entry", 1, None)]);
    assert_eq!(verdict.validation_errors[0].expected, json!("1..*"));
    assert_eq!(verdict.validation_errors[0].actual, Some(json!(0)));
}

#[test]
fn test_indexed_paths() {
    let bundle = json!({
        "entry": [
            {"resource": {"subject": {"reference": "Patient/1"}}},
            {"resource": {"subject": {}}}
        ]
    });

    assert_eq!(
        resolve_path(&bundle, "entry[0].resource.subject.reference"),
        Some(&json!("Patient/1"))
    );
    assert_eq!(
        resolve_path(&bundle, "entry.0.resource.subject.reference"),
        Some(&json!("Patient/1"))
    );
    assert_eq!(resolve_path(&bundle, "entry[1].resource.subject.reference"), None);
    assert_eq!(resolve_path(&bundle, "entry[7].resource"), None);
    assert_eq!(resolve_path(&bundle, "entry[x]"), None);
}

#[test]
fn test_performance_threshold_exceeded() {
    let verdict = evaluate_performance(&Measurements::timed(150), &response_time(100.0));

    assert!(!verdict.is_passed());
    assert_eq!(verdict.performance_metrics.len(), 1);
    let metric = &verdict.performance_metrics[0];
    assert_eq!(metric.metric, "responseTime");
    assert_eq!(metric.value, 150.0);
    assert_eq!(metric.unit, "ms");
    assert_eq!(metric.threshold, Some(100.0));
    assert!(!metric.passed);
}

#[test]
fn test_performance_within_threshold() {
    let verdict = evaluate_performance(&Measurements::timed(80), &response_time(100.0));

    assert!(verdict.is_passed());
    assert!(verdict.performance_metrics[0].passed);
    assert_eq!(verdict.performance_metrics[0].value, 80.0);
}

#[test]
fn test_performance_threshold_is_inclusive() {
    let verdict = evaluate_performance(&Measurements::timed(100), &response_time(100.0));
    assert!(verdict.is_passed());
}

#[test]
fn test_performance_sub_metrics() {
    let bundle = json!({"entry": [{}, {}, {}]});
    let measurements = Measurements::new(10, &bundle, 4096);

    let verdict = evaluate_performance(
        &measurements,
        &[
            MetricThreshold {
                metric: MetricKind::ResponseSize,
                threshold: 1024.0,
            },
            MetricThreshold {
                metric: MetricKind::EntryCount,
                threshold: 5.0,
            },
        ],
    );

    assert!(!verdict.is_passed());
    assert_eq!(verdict.performance_metrics.len(), 2);
    assert_eq!(verdict.performance_metrics[0].unit, "bytes");
    assert!(!verdict.performance_metrics[0].passed);
    assert_eq!(verdict.performance_metrics[1].value, 3.0);
    assert!(verdict.performance_metrics[1].passed);
}

#[test]
fn test_status_range() {
    let expectation = StatusExpectation::range(400, 404);

    assert!(evaluate_status(400, &expectation).is_passed());
    assert!(evaluate_status(404, &expectation).is_passed());
    assert!(!evaluate_status(410, &expectation).is_passed());
}

#[test]
fn test_evaluate_folds_every_failing_evaluator() {
    let response = ClientResponse::new(404, json!({"resourceType": "OperationOutcome"}));
    let expectation = Expectation::status(StatusExpectation::codes([200]))
        .with_field(FieldAssertion::equals("resourceType", "Patient"))
        .with_max_response_time(100);

    let verdict = evaluate(&response, 250, &expectation);

    assert!(!verdict.is_passed());
    assert_eq!(verdict.failures.len(), 3);
    assert_eq!(verdict.validation_errors.len(), 1);
    assert_eq!(verdict.performance_metrics.len(), 1);

    let details = verdict.into_details();
    let reason = details.failure_reason.unwrap();
    assert!(reason.starts_with("Unexpected status 404"));
    assert!(reason.contains("Performance threshold exceeded"));
}

#[test]
fn test_evaluate_skips_undeclared_evaluators() {
    let response = ClientResponse::new(200, json!({"resourceType": "Patient"}));
    let verdict = evaluate(&response, 5_000, &Expectation::default());

    assert!(verdict.is_passed());
    assert!(verdict.validation_errors.is_empty());
    assert!(verdict.performance_metrics.is_empty());
}
