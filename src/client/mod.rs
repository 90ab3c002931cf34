//! Remote resource access
//!
//! The execution engine talks to FHIR servers only through [`ResourceClient`],
//! so tests can substitute a deterministic implementation for the HTTP one.

mod http;
mod traits;

pub use http::HttpResourceClient;
pub use traits::ResourceClient;

use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::core::{Operation, SearchParam, TestCase};

/// A fully resolved request for one test execution
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    pub operation: Operation,
    /// Path relative to the environment's server URL
    pub path: String,
    pub query: Vec<SearchParam>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// A well-formed answer from the server, whatever its status code
#[derive(Debug, Clone, PartialEq)]
pub struct ClientResponse {
    pub status: u16,
    /// Decoded JSON body; `Null` when the server sent no content
    pub body: Value,
    pub size_bytes: usize,
}

impl ResourceRequest {
    pub fn from_test_case(test_case: &TestCase) -> Self {
        let request = &test_case.request;
        Self {
            operation: request.operation,
            path: test_case.target_path(),
            query: request.search_params.clone(),
            body: request
                .body
                .clone()
                .filter(|_| request.operation.carries_body()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Join the request path and query onto a server base URL.
    ///
    /// Path segments are appended to the base path, so a base such as
    /// `http://host/baseR4` keeps its `baseR4` segment.
    pub fn resolve_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty();
            for segment in self.path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query
                    .iter()
                    .map(|p| (p.name.as_str(), p.value.as_str())),
            );
        }

        Ok(url)
    }
}

impl ClientResponse {
    pub fn new(status: u16, body: Value) -> Self {
        let size_bytes = if body.is_null() {
            0
        } else {
            body.to_string().len()
        };
        Self {
            status,
            body,
            size_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RequestSpec, TestCategory};

    #[test]
    fn test_resolve_url_keeps_base_path() {
        let base = Url::parse("http://hapi.example.org/baseR4").unwrap();
        let request = ResourceRequest::from_test_case(
            &TestCase::new(
                "search",
                "Search",
                TestCategory::Interoperability,
                RequestSpec::search().with_param("_count", "5").with_param("name", "Smith"),
            )
            .with_resource_type("Patient"),
        );

        let url = request.resolve_url(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "http://hapi.example.org/baseR4/Patient?_count=5&name=Smith"
        );
    }

    #[test]
    fn test_resolve_url_with_trailing_slash_base() {
        let base = Url::parse("http://localhost:8080/fhir/").unwrap();
        let request = ResourceRequest::from_test_case(&TestCase::new(
            "meta",
            "Metadata",
            TestCategory::Conformance,
            RequestSpec::read("/metadata"),
        ));

        let url = request.resolve_url(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/fhir/metadata");
    }

    #[test]
    fn test_body_is_dropped_for_read_operations() {
        let mut request_spec = RequestSpec::read("Patient/1");
        request_spec.body = Some(serde_json::json!({"resourceType": "Patient"}));
        let request = ResourceRequest::from_test_case(&TestCase::new(
            "read",
            "Read",
            TestCategory::Conformance,
            request_spec,
        ));

        assert!(request.body.is_none());
    }
}
