use std::sync::Arc;

use crate::client::{HttpResourceClient, ResourceClient};
use crate::core::{FhirTestConfig, TestCase, TestEnvironment, TestResult, TestSuite};
use crate::error::Result;
use crate::execution::ExecutionEngine;
use crate::registry::{TestFilter, TestRegistry};
use crate::report::{Report, ReportFormat, generate_report};
use crate::storage::{MemoryResultStorage, ResultHistory, ResultStorage};

/// Entry point for hosting applications.
///
/// Owns one registry, one result store and one execution engine. Instances are
/// independent of each other; nothing is shared through globals.
pub struct FhirTestManager {
    registry: TestRegistry,
    storage: Arc<dyn ResultStorage>,
    engine: ExecutionEngine,
    config: FhirTestConfig,
}

impl FhirTestManager {
    /// Create a manager that talks to servers over HTTP
    pub async fn new(config: FhirTestConfig) -> Result<Self> {
        let client = Arc::new(HttpResourceClient::new(config.client.clone())?);
        Ok(Self::with_client(config, client).await)
    }

    /// Create a manager around a caller supplied client
    pub async fn with_client(config: FhirTestConfig, client: Arc<dyn ResourceClient>) -> Self {
        let registry = if config.seed_default_tests {
            TestRegistry::with_defaults().await
        } else {
            TestRegistry::new()
        };
        let storage: Arc<dyn ResultStorage> = Arc::new(MemoryResultStorage::new());
        let engine = ExecutionEngine::new(registry.clone(), Arc::clone(&storage), client);

        Self {
            registry,
            storage,
            engine,
            config,
        }
    }

    pub async fn execute_test_case(
        &self,
        test_id: &str,
        environment: &TestEnvironment,
    ) -> TestResult {
        self.engine.execute_test_case(test_id, environment).await
    }

    pub async fn execute_test_suite(
        &self,
        suite_id: &str,
        environment: &TestEnvironment,
    ) -> Vec<TestResult> {
        self.engine.execute_test_suite(suite_id, environment).await
    }

    pub async fn register_test_case(&self, test_case: TestCase) {
        self.registry.register(test_case).await;
    }

    pub async fn register_test_suite(&self, suite: TestSuite) {
        self.registry.register_suite(suite).await;
    }

    pub async fn get_test_case(&self, id: &str) -> Option<TestCase> {
        self.registry.get_test_case(id).await
    }

    pub async fn get_test_suite(&self, id: &str) -> Option<TestSuite> {
        self.registry.get_test_suite(id).await
    }

    pub async fn get_all_test_cases(&self) -> Vec<TestCase> {
        self.registry.get_all_test_cases().await
    }

    pub async fn get_all_test_suites(&self) -> Vec<TestSuite> {
        self.registry.get_all_test_suites().await
    }

    pub async fn filter_test_cases(&self, filter: &TestFilter) -> Vec<TestCase> {
        self.registry.filter(filter).await
    }

    pub async fn get_all_test_results(&self) -> Result<ResultHistory> {
        self.storage.all().await
    }

    pub async fn get_test_history(&self, test_id: &str) -> Result<Vec<TestResult>> {
        self.storage.history(test_id).await
    }

    /// Drop all recorded history. Irreversible.
    pub async fn clear_results(&self) -> Result<()> {
        self.storage.clear().await?;
        tracing::info!("Cleared test result history");
        Ok(())
    }

    /// Render the current history; `format` is one of `html`, `json` or `xml`
    pub async fn generate_test_report(&self, format: &str) -> Result<Report> {
        let format: ReportFormat = format.parse()?;
        self.generate_report_as(format).await
    }

    pub async fn generate_report_as(&self, format: ReportFormat) -> Result<Report> {
        let history = self.storage.all().await?;
        let names = self.registry.test_names().await;
        generate_report(format, &history, &names)
    }

    /// Render the current history in the configured default format
    pub async fn generate_default_report(&self) -> Result<Report> {
        self.generate_report_as(self.config.default_report_format)
            .await
    }

    pub fn config(&self) -> &FhirTestConfig {
        &self.config
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for FhirTestManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FhirTestManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
