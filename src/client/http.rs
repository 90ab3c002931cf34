use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::Value;

use super::{ClientResponse, ResourceClient, ResourceRequest};
use crate::core::{AuthConfig, ClientConfig, Operation, TestEnvironment};
use crate::error::{FhirTestError, Result, TransportError};

const FHIR_JSON: &str = "application/fhir+json";

/// [`ResourceClient`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpResourceClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FhirTestError::Client {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn method(operation: Operation) -> Method {
        match operation {
            Operation::Read | Operation::Search => Method::GET,
            Operation::Create => Method::POST,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn send(
        &self,
        environment: &TestEnvironment,
        request: &ResourceRequest,
    ) -> std::result::Result<ClientResponse, TransportError> {
        let url = request
            .resolve_url(&environment.server_url)
            .map_err(|e| TransportError::with_source("Invalid request URL", e))?;

        let user_agent = if environment.client_id.is_empty() {
            self.config.user_agent.as_str()
        } else {
            environment.client_id.as_str()
        };

        tracing::debug!(
            operation = %request.operation,
            url = %url,
            environment = %environment.name,
            "Sending request"
        );

        let mut builder = self
            .client
            .request(Self::method(request.operation), url)
            .header(ACCEPT, self.config.accept.as_str())
            .header(USER_AGENT, user_agent);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, FHIR_JSON).json(body);
        }

        builder = match &environment.auth {
            AuthConfig::None => builder,
            AuthConfig::Basic { username, password } => builder.basic_auth(username, Some(password)),
            AuthConfig::Bearer { token } => builder.bearer_auth(token),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let bytes = response.bytes().await.map_err(|e| {
            let mut err = TransportError::from(e);
            err.status = Some(status);
            err
        })?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| TransportError {
                message: format!("Malformed response body (status {status}): {e}"),
                status: Some(status),
                source: Some(Box::new(e)),
            })?
        };

        tracing::debug!(status, size = bytes.len(), "Received response");

        Ok(ClientResponse {
            status,
            body,
            size_bytes: bytes.len(),
        })
    }
}
