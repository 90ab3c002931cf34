//! # OctoFHIR FHIRTest
//!
//! An async-first framework for checking FHIR servers: define test cases and
//! suites, execute them against a live server, evaluate status, structural and
//! performance assertions, and export the accumulated results as reports.
//!
//! ## Features
//!
//! - **Registry**: built-in catalogue of FHIR server checks, extensible at runtime
//! - **Sequential suites**: deterministic ordering with optional stop-on-failure
//! - **Pure evaluators**: status, field-level conformance and performance thresholds
//! - **Reports**: HTML, JSON and XML exports with integrity checksums
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octofhir_fhirtest::*;
//!
//! # async fn example() -> Result<()> {
//! let manager = FhirTestManager::new(FhirTestConfig::default()).await?;
//! let environment = TestEnvironment::parse("hapi", "https://hapi.fhir.org/baseR4")?;
//!
//! let results = manager.execute_test_suite("core-conformance", &environment).await;
//! for result in &results {
//!     println!("{}: {}", result.test_id, result.status);
//! }
//!
//! let report = manager.generate_test_report("html").await?;
//! report.write_to("reports").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod error;
pub mod execution;
pub mod registry;
pub mod report;
pub mod storage;
pub mod utils;
pub mod validation;

pub use client::{ClientResponse, HttpResourceClient, ResourceClient, ResourceRequest};
pub use crate::core::*;
pub use error::Result;
pub use error::{FhirTestError, TransportError};
pub use execution::{ExecutionEngine, SUITE_ABORTED, SUITE_NOT_FOUND, TEST_NOT_FOUND};
pub use registry::{TestFilter, TestRegistry};
pub use report::{Report, ReportDocument, ReportEntry, ReportFormat, ReportSummary};
pub use storage::{MemoryResultStorage, ResultHistory, ResultStorage};
pub use validation::{Verdict, evaluate};
