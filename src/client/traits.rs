use async_trait::async_trait;

use super::{ClientResponse, ResourceRequest};
use crate::core::TestEnvironment;
use crate::error::TransportError;

#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Perform a single request against `environment`.
    ///
    /// Any HTTP answer with a decodable body is `Ok`, whatever its status code.
    /// Network failures, timeouts and undecodable bodies are `Err`.
    /// Implementations make exactly one attempt and must not panic.
    async fn send(
        &self,
        environment: &TestEnvironment,
        request: &ResourceRequest,
    ) -> Result<ClientResponse, TransportError>;
}
