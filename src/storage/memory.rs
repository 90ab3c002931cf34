use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::TestResult;
use crate::error::{FhirTestError, Result};
use crate::storage::{ResultHistory, ResultStorage};

#[derive(Debug)]
pub struct MemoryResultStorage {
    results: Arc<RwLock<ResultHistory>>,
}

impl MemoryResultStorage {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(ResultHistory::new())),
        }
    }

    /// Number of tests with at least one stored result
    pub async fn test_count(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStorage for MemoryResultStorage {
    async fn append(&self, result: TestResult) -> Result<()> {
        if !result.is_terminal() {
            return Err(FhirTestError::Storage {
                message: format!(
                    "refusing to store non-terminal result for '{}' (status {})",
                    result.test_id, result.status
                ),
            });
        }

        let mut results = self.results.write().await;
        results
            .entry(result.test_id.clone())
            .or_default()
            .push(result);
        Ok(())
    }

    async fn history(&self, test_id: &str) -> Result<Vec<TestResult>> {
        let results = self.results.read().await;
        Ok(results.get(test_id).cloned().unwrap_or_default())
    }

    async fn latest(&self, test_id: &str) -> Result<Option<TestResult>> {
        let results = self.results.read().await;
        Ok(results.get(test_id).and_then(|h| h.last().cloned()))
    }

    async fn all(&self) -> Result<ResultHistory> {
        Ok(self.results.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.results.write().await.clear();
        Ok(())
    }

    async fn size(&self) -> Result<usize> {
        let results = self.results.read().await;
        Ok(results.values().map(Vec::len).sum())
    }
}

impl Default for MemoryResultStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryResultStorage {
    fn clone(&self) -> Self {
        Self {
            results: Arc::clone(&self.results),
        }
    }
}
