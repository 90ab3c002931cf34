//! Report generation over the accumulated result history
//!
//! Rendering is a pure read of a history snapshot. Every format carries, per
//! test, its id, name, latest status, execution time and timestamp along with
//! the full list of recorded executions and their diagnostics.

mod html;
mod xml;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{TestResult, TestStatus};
use crate::error::{FhirTestError, Result};
use crate::storage::ResultHistory;
use crate::utils::ReportFingerprint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Json,
    Xml,
}

/// Per-status execution counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub id: String,
    pub name: String,
    /// Status of the most recent execution
    pub status: TestStatus,
    pub execution_time: u64,
    pub timestamp: DateTime<Utc>,
    /// Every recorded execution, oldest first
    pub results: Vec<TestResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub tests: Vec<ReportEntry>,
}

/// A rendered report ready to be offered as a download
#[derive(Debug, Clone)]
pub struct Report {
    pub format: ReportFormat,
    pub file_name: String,
    pub content: String,
    pub fingerprint: ReportFingerprint,
}

impl ReportFormat {
    pub fn all() -> &'static [ReportFormat] {
        &[ReportFormat::Html, ReportFormat::Json, ReportFormat::Xml]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Xml => "xml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ReportFormat::Html => "text/html",
            ReportFormat::Json => "application/json",
            ReportFormat::Xml => "text/xml",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = FhirTestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            "xml" => Ok(ReportFormat::Xml),
            _ => Err(FhirTestError::UnsupportedReportFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl ReportSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            match result.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Error => summary.errors += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::Running => {}
            }
        }
        summary
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

impl ReportDocument {
    /// Build a document from a history snapshot; `names` maps test ids to display names
    pub fn build(history: &ResultHistory, names: &IndexMap<String, String>) -> Self {
        let tests = history
            .iter()
            .filter_map(|(id, results)| {
                let latest = results.last()?;
                Some(ReportEntry {
                    id: id.clone(),
                    name: names.get(id).cloned().unwrap_or_else(|| id.clone()),
                    status: latest.status,
                    execution_time: latest.execution_time,
                    timestamp: latest.timestamp,
                    results: results.clone(),
                })
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            summary: ReportSummary::from_results(history.values().flatten()),
            tests,
        }
    }
}

impl Report {
    pub fn render(format: ReportFormat, document: &ReportDocument) -> Result<Self> {
        let content = match format {
            ReportFormat::Html => html::render(document),
            ReportFormat::Json => serde_json::to_string_pretty(document)?,
            ReportFormat::Xml => xml::render(document)?,
        };

        Ok(Self {
            format,
            file_name: format!(
                "fhir-test-report-{}.{}",
                document.generated_at.format("%Y%m%dT%H%M%SZ"),
                format.extension()
            ),
            fingerprint: ReportFingerprint::of(content.as_bytes()),
            content,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Write the report into `dir` under its file name
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.content.as_bytes()).await?;
        tracing::info!(
            path = %path.display(),
            checksum = %self.fingerprint.short_hash(),
            "Wrote test report"
        );
        Ok(path)
    }
}

/// Render a history snapshot in the requested format
pub fn generate_report(
    format: ReportFormat,
    history: &ResultHistory,
    names: &IndexMap<String, String>,
) -> Result<Report> {
    Report::render(format, &ReportDocument::build(history, names))
}
