use serde_json::json;
use std::time::Duration;

use crate::core::{
    Expectation, FieldAssertion, MetricKind, RequestSpec, StatusExpectation, TestCase,
    TestCategory, TestSeverity, TestSuite, ValueKind,
};
use crate::report::ReportFormat;

pub fn default_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            "capability-statement",
            "Server publishes a CapabilityStatement",
            TestCategory::Conformance,
            RequestSpec::read("metadata"),
        )
        .with_description("GET [base]/metadata must return a CapabilityStatement with REST capabilities")
        .with_severity(TestSeverity::Critical)
        .with_resource_type("CapabilityStatement")
        .with_expectation(
            Expectation::status(StatusExpectation::codes([200]))
                .with_field(FieldAssertion::equals("resourceType", "CapabilityStatement"))
                .with_field(FieldAssertion::present_as("fhirVersion", ValueKind::String))
                .with_field(FieldAssertion::matches("status", "^(draft|active|retired|unknown)$"))
                .with_field(FieldAssertion::cardinality("rest", 1, None))
                .with_max_response_time(2000),
        ),
        TestCase::new(
            "patient-search",
            "Patient search returns a searchset Bundle",
            TestCategory::Interoperability,
            RequestSpec::search().with_param("_count", "5"),
        )
        .with_description("Searching Patient with _count must return a Bundle of type searchset honouring the page size")
        .with_severity(TestSeverity::Major)
        .with_resource_type("Patient")
        .with_expectation(
            Expectation::default()
                .with_field(FieldAssertion::equals("resourceType", "Bundle"))
                .with_field(FieldAssertion::equals("type", "searchset"))
                .with_field(FieldAssertion::cardinality("entry", 0, Some(5))),
        ),
        TestCase::new(
            "patient-create",
            "Create a valid Patient",
            TestCategory::Validation,
            RequestSpec::create(
                "Patient",
                json!({
                    "resourceType": "Patient",
                    "active": true,
                    "name": [{"use": "official", "family": "Chalmers", "given": ["Peter", "James"]}],
                    "gender": "male",
                    "birthDate": "1974-12-25"
                }),
            ),
        )
        .with_description("POST of a valid Patient must be accepted and return the stored resource with a server id")
        .with_severity(TestSeverity::Critical)
        .with_resource_type("Patient")
        .with_expectation(
            Expectation::status(StatusExpectation::codes([200, 201]))
                .with_field(FieldAssertion::equals("resourceType", "Patient"))
                .with_field(FieldAssertion::present_as("id", ValueKind::String)),
        ),
        TestCase::new(
            "patient-read-unknown",
            "Reading an unknown Patient returns 404",
            TestCategory::Conformance,
            RequestSpec::read("Patient/octofhir-does-not-exist"),
        )
        .with_description("Reading a resource id that was never created must answer 404 or 410")
        .with_severity(TestSeverity::Minor)
        .with_resource_type("Patient")
        .with_expectation(Expectation::status(StatusExpectation::codes([404, 410]))),
        TestCase::new(
            "invalid-resource-rejected",
            "Invalid Patient is rejected",
            TestCategory::Validation,
            RequestSpec::create(
                "Patient",
                json!({
                    "resourceType": "Patient",
                    "birthDate": "not-a-date",
                    "gender": "unknown-code"
                }),
            ),
        )
        .with_description("POST of a Patient with malformed primitives must be rejected with an OperationOutcome")
        .with_severity(TestSeverity::Major)
        .with_resource_type("Patient")
        .with_expectation(
            Expectation::status(StatusExpectation::codes([400, 422]))
                .with_field(FieldAssertion::equals("resourceType", "OperationOutcome"))
                .with_field(FieldAssertion::cardinality("issue", 1, None)),
        ),
        TestCase::new(
            "unknown-resource-type",
            "Unknown resource types are refused",
            TestCategory::Security,
            RequestSpec::read("NotAResourceType/1"),
        )
        .with_description("Requests for undefined resource types must not succeed")
        .with_severity(TestSeverity::Info)
        .with_expectation(Expectation::status(StatusExpectation::range(400, 404))),
        TestCase::new(
            "encounter-subject-reference",
            "Encounters reference their subject",
            TestCategory::Interoperability,
            RequestSpec::search().with_param("_count", "1"),
        )
        .with_description("The first Encounter returned by search must carry a subject reference")
        .with_severity(TestSeverity::Minor)
        .with_resource_type("Encounter")
        .with_expectation(
            Expectation::default()
                .with_field(FieldAssertion::equals("resourceType", "Bundle"))
                .with_field(FieldAssertion::present_as(
                    "entry[0].resource.subject.reference",
                    ValueKind::String,
                )),
        ),
        TestCase::new(
            "observation-search-performance",
            "Observation search responds quickly",
            TestCategory::Performance,
            RequestSpec::search().with_param("_count", "50"),
        )
        .with_description("A 50 entry Observation page must be served within 1s and stay under 1 MiB")
        .with_severity(TestSeverity::Major)
        .with_resource_type("Observation")
        .with_expectation(
            Expectation::default()
                .with_max_response_time(1000)
                .with_threshold(MetricKind::ResponseSize, 1_048_576.0)
                .with_threshold(MetricKind::EntryCount, 50.0),
        ),
    ]
}

pub fn default_test_suites() -> Vec<TestSuite> {
    vec![
        TestSuite::new("core-conformance", "Core conformance")
            .with_description("Baseline RESTful behaviour every FHIR server must show")
            .with_tests([
                "capability-statement",
                "patient-read-unknown",
                "unknown-resource-type",
            ]),
        TestSuite::new("patient-workflow", "Patient workflow")
            .with_description("Create, search and validation round for Patient; later steps depend on earlier ones")
            .with_tests([
                "patient-create",
                "patient-search",
                "invalid-resource-rejected",
            ])
            .with_stop_on_failure(true),
        TestSuite::new("performance-baseline", "Performance baseline")
            .with_description("Response time and payload size of common searches")
            .with_tests(["observation-search-performance", "patient-search"])
            .with_timeout(Duration::from_secs(10))
            .with_report_format(ReportFormat::Html),
    ]
}
