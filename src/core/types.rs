use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::core::FhirVersion;
use crate::error::Result;
use crate::report::ReportFormat;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TestCategory {
    Validation,
    Conformance,
    Interoperability,
    Performance,
    Security,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TestSeverity {
    Critical,
    Major,
    Minor,
    Info,
}

/// RESTful interaction issued for a test case
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Search,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    pub operation: Operation,
    /// Path relative to the server base, e.g. `Patient/example` or `metadata`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_params: Vec<SearchParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatusExpectation {
    Codes { codes: Vec<u16> },
    Range { min: u16, max: u16 },
}

/// JSON value kinds a field assertion can require
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "check", rename_all = "camelCase")]
pub enum FieldCheck {
    Present {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<ValueKind>,
    },
    Equals {
        value: Value,
    },
    Matches {
        pattern: String,
    },
    Cardinality {
        min: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldAssertion {
    pub path: String,
    pub check: FieldCheck,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    /// Wall-clock time of the network call in milliseconds
    ResponseTime,
    /// Size of the raw response body in bytes
    ResponseSize,
    /// Number of `entry` elements in a returned Bundle
    EntryCount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricThreshold {
    pub metric: MetricKind,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expectation {
    #[serde(default)]
    pub status: StatusExpectation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldAssertion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performance: Vec<MetricThreshold>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: TestCategory,
    pub severity: TestSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub request: RequestSpec,
    #[serde(default)]
    pub expectation: Expectation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    pub report_format: ReportFormat,
    pub stop_on_failure: bool,
    /// Per-request timeout applied to every test of the suite
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    pub test_case_ids: Vec<String>,
    #[serde(default)]
    pub config: SuiteConfig,
}

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum AuthConfig {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
}

/// Target server and identity a run is executed against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEnvironment {
    pub name: String,
    pub server_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    pub fhir_version: FhirVersion,
    pub client_id: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
    Skipped,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldViolation {
    pub path: String,
    pub expected: Value,
    /// `None` when the path does not resolve in the response body
    pub actual: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetric {
    pub metric: String,
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<FieldViolation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performance_metrics: Vec<PerformanceMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: String,
    pub run_id: Uuid,
    pub status: TestStatus,
    /// Milliseconds spent on the network call and evaluation
    pub execution_time: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: TestDetails,
}

/// An execution that has started but not reached a terminal status.
///
/// Consuming one of the finishing methods is the only way to obtain a
/// terminal [`TestResult`], so a single execution can never be completed twice.
#[derive(Debug)]
pub struct RunningTest {
    test_id: String,
    run_id: Uuid,
    started_at: DateTime<Utc>,
}

impl Operation {
    pub fn method(&self) -> &'static str {
        match self {
            Operation::Read | Operation::Search => "GET",
            Operation::Create => "POST",
            Operation::Update => "PUT",
            Operation::Delete => "DELETE",
        }
    }

    pub fn carries_body(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Search => "search",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

impl SearchParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl RequestSpec {
    fn new(operation: Operation, path: Option<String>, body: Option<Value>) -> Self {
        Self {
            operation,
            path,
            search_params: Vec::new(),
            body,
        }
    }

    pub fn read(path: impl Into<String>) -> Self {
        Self::new(Operation::Read, Some(path.into()), None)
    }

    /// Search against the test case's resource type unless a path is set
    pub fn search() -> Self {
        Self::new(Operation::Search, None, None)
    }

    pub fn create(path: impl Into<String>, body: Value) -> Self {
        Self::new(Operation::Create, Some(path.into()), Some(body))
    }

    pub fn update(path: impl Into<String>, body: Value) -> Self {
        Self::new(Operation::Update, Some(path.into()), Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Operation::Delete, Some(path.into()), None)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.search_params.push(SearchParam::new(name, value));
        self
    }
}

impl StatusExpectation {
    pub fn codes(codes: impl IntoIterator<Item = u16>) -> Self {
        Self::Codes {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn range(min: u16, max: u16) -> Self {
        Self::Range { min, max }
    }

    pub fn contains(&self, status: u16) -> bool {
        match self {
            StatusExpectation::Codes { codes } => codes.contains(&status),
            StatusExpectation::Range { min, max } => (*min..=*max).contains(&status),
        }
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::range(200, 299)
    }
}

impl std::fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusExpectation::Codes { codes } => {
                let codes: Vec<String> = codes.iter().map(u16::to_string).collect();
                write!(f, "one of [{}]", codes.join(", "))
            }
            StatusExpectation::Range { min, max } => write!(f, "{min}-{max}"),
        }
    }
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldAssertion {
    pub fn present(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            check: FieldCheck::Present { kind: None },
        }
    }

    pub fn present_as(path: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            path: path.into(),
            check: FieldCheck::Present { kind: Some(kind) },
        }
    }

    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            check: FieldCheck::Equals {
                value: value.into(),
            },
        }
    }

    pub fn matches(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            check: FieldCheck::Matches {
                pattern: pattern.into(),
            },
        }
    }

    pub fn cardinality(path: impl Into<String>, min: usize, max: Option<usize>) -> Self {
        Self {
            path: path.into(),
            check: FieldCheck::Cardinality { min, max },
        }
    }
}

impl MetricKind {
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::ResponseTime => "responseTime",
            MetricKind::ResponseSize => "responseSize",
            MetricKind::EntryCount => "entryCount",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::ResponseTime => "ms",
            MetricKind::ResponseSize => "bytes",
            MetricKind::EntryCount => "entries",
        }
    }
}

impl Default for Expectation {
    fn default() -> Self {
        Self {
            status: StatusExpectation::default(),
            fields: Vec::new(),
            performance: Vec::new(),
        }
    }
}

impl Expectation {
    pub fn status(status: StatusExpectation) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_field(mut self, assertion: FieldAssertion) -> Self {
        self.fields.push(assertion);
        self
    }

    pub fn with_threshold(mut self, metric: MetricKind, threshold: f64) -> Self {
        self.performance.push(MetricThreshold { metric, threshold });
        self
    }

    pub fn with_max_response_time(self, millis: u64) -> Self {
        self.with_threshold(MetricKind::ResponseTime, millis as f64)
    }
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: TestCategory,
        request: RequestSpec,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            severity: TestSeverity::Major,
            resource_type: None,
            request,
            expectation: Expectation::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_severity(mut self, severity: TestSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectation = expectation;
        self
    }

    /// Relative request path: the explicit path, falling back to the resource type
    pub fn target_path(&self) -> String {
        self.request
            .path
            .clone()
            .or_else(|| self.resource_type.clone())
            .unwrap_or_default()
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            report_format: ReportFormat::Json,
            stop_on_failure: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TestSuite {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            version: "1.0.0".to_string(),
            test_case_ids: Vec::new(),
            config: SuiteConfig::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_test(mut self, test_id: impl Into<String>) -> Self {
        self.test_case_ids.push(test_id.into());
        self
    }

    pub fn with_tests<I, S>(mut self, test_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_case_ids
            .extend(test_ids.into_iter().map(Into::into));
        self
    }

    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.config.stop_on_failure = stop;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.config.report_format = format;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            AuthConfig::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

impl TestEnvironment {
    pub fn new(name: impl Into<String>, server_url: Url) -> Self {
        Self {
            name: name.into(),
            server_url,
            server_name: None,
            server_version: None,
            fhir_version: FhirVersion::R4,
            client_id: format!("octofhir-fhirtest/{}", env!("CARGO_PKG_VERSION")),
            auth: AuthConfig::None,
        }
    }

    pub fn parse(name: impl Into<String>, server_url: &str) -> Result<Self> {
        Ok(Self::new(name, Url::parse(server_url)?))
    }

    pub fn with_server(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self.server_version = Some(version.into());
        self
    }

    pub fn with_fhir_version(mut self, version: FhirVersion) -> Self {
        self.fhir_version = version;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }
}

impl TestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
            TestStatus::Running => "running",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TestDetails {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            failure_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failure_reason.is_none()
            && self.validation_errors.is_empty()
            && self.performance_metrics.is_empty()
    }
}

impl TestResult {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.details.failure_reason.as_deref()
    }
}

impl RunningTest {
    pub fn start(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// In-flight view of this execution with status `running`
    pub fn snapshot(&self) -> TestResult {
        self.build(TestStatus::Running, 0, TestDetails::default())
    }

    pub fn passed(self, execution_time: u64, details: TestDetails) -> TestResult {
        self.build(TestStatus::Passed, execution_time, details)
    }

    pub fn failed(self, execution_time: u64, details: TestDetails) -> TestResult {
        self.build(TestStatus::Failed, execution_time, details)
    }

    pub fn error(self, execution_time: u64, reason: impl Into<String>) -> TestResult {
        self.build(TestStatus::Error, execution_time, TestDetails::with_reason(reason))
    }

    pub fn skipped(self, reason: impl Into<String>) -> TestResult {
        self.build(TestStatus::Skipped, 0, TestDetails::with_reason(reason))
    }

    fn build(&self, status: TestStatus, execution_time: u64, details: TestDetails) -> TestResult {
        TestResult {
            test_id: self.test_id.clone(),
            run_id: self.run_id,
            status,
            execution_time,
            timestamp: self.started_at,
            details,
        }
    }
}
