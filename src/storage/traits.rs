use async_trait::async_trait;
use indexmap::IndexMap;

use crate::core::TestResult;
use crate::error::Result;

/// Execution history: test id to results, oldest first.
///
/// Test ids keep the order in which they were first executed.
pub type ResultHistory = IndexMap<String, Vec<TestResult>>;

#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Append a terminal result to the history of its test.
    ///
    /// Results with a non-terminal status are rejected.
    async fn append(&self, result: TestResult) -> Result<()>;
    async fn history(&self, test_id: &str) -> Result<Vec<TestResult>>;
    async fn latest(&self, test_id: &str) -> Result<Option<TestResult>>;
    async fn all(&self) -> Result<ResultHistory>;
    async fn clear(&self) -> Result<()>;
    /// Total number of stored results across all tests
    async fn size(&self) -> Result<usize>;
}
