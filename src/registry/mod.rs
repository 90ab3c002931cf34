//! In-memory registry of test case and test suite definitions

mod defaults;

pub use defaults::{default_test_cases, default_test_suites};

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::{TestCase, TestCategory, TestSeverity, TestSuite};

/// Criteria for selecting test cases; unset criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestFilter {
    pub category: Option<TestCategory>,
    pub severity: Option<TestSeverity>,
    pub resource_type: Option<String>,
}

/// Registry of test definitions.
///
/// Registration overwrites by id (last write wins) and keeps the position of
/// the first registration. Definitions are never removed implicitly.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    test_cases: Arc<RwLock<IndexMap<String, TestCase>>>,
    test_suites: Arc<RwLock<IndexMap<String, TestSuite>>>,
}

impl TestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: TestCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_severity(mut self, severity: TestSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn matches(&self, test_case: &TestCase) -> bool {
        self.category.is_none_or(|c| c == test_case.category)
            && self.severity.is_none_or(|s| s == test_case.severity)
            && self
                .resource_type
                .as_deref()
                .is_none_or(|r| test_case.resource_type.as_deref() == Some(r))
    }
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in FHIR server checks and suites
    pub async fn with_defaults() -> Self {
        let registry = Self::new();
        registry.seed_defaults().await;
        registry
    }

    pub async fn seed_defaults(&self) {
        for test_case in default_test_cases() {
            self.register(test_case).await;
        }
        for suite in default_test_suites() {
            self.register_suite(suite).await;
        }
        tracing::debug!(
            test_cases = self.test_cases.read().await.len(),
            test_suites = self.test_suites.read().await.len(),
            "Seeded default test catalogue"
        );
    }

    pub async fn register(&self, test_case: TestCase) {
        let mut test_cases = self.test_cases.write().await;
        if test_cases.contains_key(&test_case.id) {
            tracing::debug!(test_id = %test_case.id, "Replacing registered test case");
        }
        test_cases.insert(test_case.id.clone(), test_case);
    }

    pub async fn register_suite(&self, suite: TestSuite) {
        let mut test_suites = self.test_suites.write().await;
        if test_suites.contains_key(&suite.id) {
            tracing::debug!(suite_id = %suite.id, "Replacing registered test suite");
        }
        test_suites.insert(suite.id.clone(), suite);
    }

    pub async fn get_test_case(&self, id: &str) -> Option<TestCase> {
        self.test_cases.read().await.get(id).cloned()
    }

    pub async fn get_test_suite(&self, id: &str) -> Option<TestSuite> {
        self.test_suites.read().await.get(id).cloned()
    }

    pub async fn get_all_test_cases(&self) -> Vec<TestCase> {
        self.test_cases.read().await.values().cloned().collect()
    }

    pub async fn get_all_test_suites(&self) -> Vec<TestSuite> {
        self.test_suites.read().await.values().cloned().collect()
    }

    pub async fn filter(&self, filter: &TestFilter) -> Vec<TestCase> {
        self.test_cases
            .read()
            .await
            .values()
            .filter(|tc| filter.matches(tc))
            .cloned()
            .collect()
    }

    /// Display names of every registered test case, keyed by id
    pub async fn test_names(&self) -> IndexMap<String, String> {
        self.test_cases
            .read()
            .await
            .iter()
            .map(|(id, tc)| (id.clone(), tc.name.clone()))
            .collect()
    }
}
