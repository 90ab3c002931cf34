use std::sync::Arc;
use std::time::Duration;

use crate::client::{ResourceClient, ResourceRequest};
use crate::core::{RunningTest, TestCase, TestEnvironment, TestResult, TestStatus};
use crate::error::TransportError;
use crate::registry::TestRegistry;
use crate::report::ReportSummary;
use crate::storage::ResultStorage;
use crate::utils::Timer;
use crate::validation::evaluate;

use super::{SUITE_ABORTED, SUITE_NOT_FOUND, TEST_NOT_FOUND};

/// Runs test cases and suites against a caller supplied environment.
///
/// Suites execute strictly sequentially in declared order; tests may depend on
/// server state left behind by earlier tests. Concurrent calls for the same
/// test id are not serialized here.
pub struct ExecutionEngine {
    registry: TestRegistry,
    storage: Arc<dyn ResultStorage>,
    client: Arc<dyn ResourceClient>,
}

impl ExecutionEngine {
    pub fn new(
        registry: TestRegistry,
        storage: Arc<dyn ResultStorage>,
        client: Arc<dyn ResourceClient>,
    ) -> Self {
        Self {
            registry,
            storage,
            client,
        }
    }

    /// Execute one test case. Every failure mode is reported as a result status.
    pub async fn execute_test_case(
        &self,
        test_id: &str,
        environment: &TestEnvironment,
    ) -> TestResult {
        self.run_test_case(test_id, environment, None).await
    }

    /// Execute every test of a suite in declared order
    pub async fn execute_test_suite(
        &self,
        suite_id: &str,
        environment: &TestEnvironment,
    ) -> Vec<TestResult> {
        let Some(suite) = self.registry.get_test_suite(suite_id).await else {
            tracing::warn!(suite_id, "Test suite not found");
            return vec![RunningTest::start(suite_id).skipped(SUITE_NOT_FOUND)];
        };

        tracing::info!(
            suite_id,
            tests = suite.test_case_ids.len(),
            environment = %environment.name,
            stop_on_failure = suite.config.stop_on_failure,
            "Running test suite"
        );

        let mut results = Vec::with_capacity(suite.test_case_ids.len());
        let mut remaining = suite.test_case_ids.iter();

        for test_id in remaining.by_ref() {
            let result = self
                .run_test_case(test_id, environment, Some(suite.config.timeout))
                .await;
            let abort = suite.config.stop_on_failure && result.status != TestStatus::Passed;
            results.push(result);

            if abort {
                tracing::warn!(
                    suite_id,
                    test_id = %test_id,
                    "Stopping suite after first non-passing test"
                );
                break;
            }
        }

        for test_id in remaining {
            let skipped = RunningTest::start(test_id.as_str()).skipped(SUITE_ABORTED);
            results.push(self.record(skipped).await);
        }

        let summary = ReportSummary::from_results(results.iter());
        tracing::info!(
            suite_id,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            skipped = summary.skipped,
            "Test suite finished"
        );

        results
    }

    async fn run_test_case(
        &self,
        test_id: &str,
        environment: &TestEnvironment,
        timeout: Option<Duration>,
    ) -> TestResult {
        let running = RunningTest::start(test_id);

        let result = match self.registry.get_test_case(test_id).await {
            Some(test_case) => self.run(running, &test_case, environment, timeout).await,
            None => {
                tracing::warn!(test_id, "Test case not found");
                running.skipped(TEST_NOT_FOUND)
            }
        };

        self.record(result).await
    }

    async fn run(
        &self,
        running: RunningTest,
        test_case: &TestCase,
        environment: &TestEnvironment,
        timeout: Option<Duration>,
    ) -> TestResult {
        let mut request = ResourceRequest::from_test_case(test_case);
        if let Some(timeout) = timeout {
            request = request.with_timeout(timeout);
        }

        tracing::debug!(
            test_id = %test_case.id,
            run_id = %running.run_id(),
            operation = %request.operation,
            path = %request.path,
            "Executing test case"
        );

        let timer = Timer::new();
        match self.client.send(environment, &request).await {
            Ok(response) => {
                let response_time = timer.elapsed_ms();
                let verdict = evaluate(&response, response_time, &test_case.expectation);
                let execution_time = timer.elapsed_ms();

                if verdict.is_passed() {
                    running.passed(execution_time, verdict.into_details())
                } else {
                    running.failed(execution_time, verdict.into_details())
                }
            }
            Err(err) => {
                let execution_time = timer.elapsed_ms();
                tracing::warn!(test_id = %test_case.id, error = %err, "Transport failure");
                running.error(execution_time, transport_reason(&err))
            }
        }
    }

    async fn record(&self, result: TestResult) -> TestResult {
        if let Err(e) = self.storage.append(result.clone()).await {
            tracing::error!(test_id = %result.test_id, error = %e, "Failed to store test result");
        }

        #[cfg(feature = "performance-metrics")]
        {
            metrics::counter!("fhirtest_executions_total", "status" => result.status.as_str())
                .increment(1);
            metrics::histogram!("fhirtest_execution_time_ms").record(result.execution_time as f64);
        }

        tracing::debug!(
            test_id = %result.test_id,
            status = %result.status,
            execution_time = result.execution_time,
            "Recorded test result"
        );

        result
    }
}

fn transport_reason(err: &TransportError) -> String {
    match err.status {
        Some(status) => format!("{} (status {status})", err.message),
        None => err.message.clone(),
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
