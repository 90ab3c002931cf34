use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{FhirTestError, Result};
use crate::report::ReportFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FhirTestConfig {
    pub client: ClientConfig,
    pub seed_default_tests: bool,
    pub default_report_format: ReportFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FhirVersion {
    #[serde(rename = "4.0.1")]
    R4,
    #[serde(rename = "4.3.0")]
    R4B,
    #[serde(rename = "5.0.0")]
    R5,
    #[serde(rename = "6.0.0-ballot3")]
    R6,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Upper bound for a single request when the suite does not set one
    pub timeout: Duration,
    pub accept: String,
    /// Fallback `User-Agent` when the environment carries no client identity
    pub user_agent: String,
}

impl Default for FhirTestConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            seed_default_tests: true,
            default_report_format: ReportFormat::Json,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept: "application/fhir+json".to_string(),
            user_agent: format!("octofhir-fhirtest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FhirTestConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FhirTestError::Configuration {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_client_config(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_default_tests(mut self, enabled: bool) -> Self {
        self.seed_default_tests = enabled;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.default_report_format = format;
        self
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl std::fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FhirVersion::R4 => write!(f, "4.0.1"),
            FhirVersion::R4B => write!(f, "4.3.0"),
            FhirVersion::R5 => write!(f, "5.0.0"),
            FhirVersion::R6 => write!(f, "6.0.0-ballot3"),
        }
    }
}

impl std::str::FromStr for FhirVersion {
    type Err = FhirTestError;

    fn from_str(s: &str) -> Result<Self> {
        FhirVersion::all()
            .iter()
            .copied()
            .find(|v| v.short_name().eq_ignore_ascii_case(s) || v.to_string() == s)
            .ok_or_else(|| FhirTestError::Configuration {
                message: format!("unknown FHIR version '{s}'"),
            })
    }
}

impl FhirVersion {
    /// Get all supported FHIR versions
    pub fn all() -> &'static [FhirVersion] {
        &[
            FhirVersion::R4,
            FhirVersion::R4B,
            FhirVersion::R5,
            FhirVersion::R6,
        ]
    }

    /// Get a short identifier for this version (e.g., "r4", "r4b")
    pub fn short_name(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "r4",
            FhirVersion::R4B => "r4b",
            FhirVersion::R5 => "r5",
            FhirVersion::R6 => "r6",
        }
    }
}
