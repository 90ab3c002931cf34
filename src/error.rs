use thiserror::Error;

#[derive(Error, Debug)]
pub enum FhirTestError {
    #[error("Registry error: {message}")]
    Registry { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Report error: {message}")]
    Report { message: String },

    #[error("Unsupported report format: {format} (expected one of: html, json, xml)")]
    UnsupportedReportFormat { format: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Client error: {message}")]
    Client { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Failure at the remote client boundary.
///
/// Carries the HTTP status when the server answered but the exchange could
/// still not be turned into a usable response (for example a body that is not
/// JSON).
#[derive(Error, Debug)]
#[error("Transport error: {message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };

        Self {
            message,
            status,
            source: Some(Box::new(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, FhirTestError>;
