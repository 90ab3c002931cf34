use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use octofhir_fhirtest::{
    ClientResponse, Expectation, FieldAssertion, FhirTestConfig, FhirTestManager,
    MemoryResultStorage, RequestSpec, ResourceClient, ResourceRequest, ResultStorage,
    StatusExpectation, TestCase, TestCategory, TestEnvironment, TestRegistry, TransportError,
};
use octofhir_fhirtest::execution::ExecutionEngine;

/// What the scripted client answers for a given request path
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Scripted {
    Respond {
        status: u16,
        body: Value,
        delay: Duration,
    },
    Fail {
        message: String,
        status: Option<u16>,
    },
}

/// Deterministic [`ResourceClient`] answering from a path-keyed script
#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<ResourceRequest>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: Value) -> Self {
        self.respond_after(path, status, body, Duration::ZERO)
    }

    pub fn respond_after(self, path: &str, status: u16, body: Value, delay: Duration) -> Self {
        self.script.lock().unwrap().insert(
            path.to_string(),
            Scripted::Respond {
                status,
                body,
                delay,
            },
        );
        self
    }

    pub fn fail(self, path: &str, message: &str) -> Self {
        self.script.lock().unwrap().insert(
            path.to_string(),
            Scripted::Fail {
                message: message.to_string(),
                status: None,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<ResourceRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn called_paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    async fn send(
        &self,
        _environment: &TestEnvironment,
        request: &ResourceRequest,
    ) -> Result<ClientResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        let scripted = self.script.lock().unwrap().get(&request.path).cloned();

        match scripted {
            Some(Scripted::Respond {
                status,
                body,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(ClientResponse::new(status, body))
            }
            Some(Scripted::Fail { message, status }) => Err(TransportError {
                message,
                status,
                source: None,
            }),
            None => Err(TransportError::new(format!(
                "no scripted response for {}",
                request.path
            ))),
        }
    }
}

#[allow(dead_code)]
pub fn test_environment() -> TestEnvironment {
    TestEnvironment::parse("test", "http://fhir.test/baseR4")
        .unwrap()
        .with_server("TestServer", "1.0.0")
        .with_client_id("fhirtest-suite/1.0")
}

#[allow(dead_code)]
pub fn read_test(id: &str, path: &str) -> TestCase {
    TestCase::new(id, format!("Read {path}"), TestCategory::Conformance, RequestSpec::read(path))
}

#[allow(dead_code)]
pub fn encounter_test() -> TestCase {
    read_test("encounter-read", "Encounter/1")
        .with_resource_type("Encounter")
        .with_expectation(
            Expectation::status(StatusExpectation::codes([200]))
                .with_field(FieldAssertion::equals("resourceType", "Encounter"))
                .with_field(FieldAssertion::present("subject.reference")),
        )
}

#[allow(dead_code)]
pub fn patient_body() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "example",
        "name": [{"family": "Chalmers", "given": ["Peter"]}]
    })
}

/// Engine wired to a fresh registry and store around `client`
#[allow(dead_code)]
pub struct Harness {
    pub registry: TestRegistry,
    pub storage: Arc<MemoryResultStorage>,
    pub client: Arc<ScriptedClient>,
    pub engine: ExecutionEngine,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(client: ScriptedClient) -> Self {
        let registry = TestRegistry::new();
        let storage = Arc::new(MemoryResultStorage::new());
        let client = Arc::new(client);
        let engine = ExecutionEngine::new(
            registry.clone(),
            Arc::clone(&storage) as Arc<dyn ResultStorage>,
            Arc::clone(&client) as Arc<dyn ResourceClient>,
        );

        Self {
            registry,
            storage,
            client,
            engine,
        }
    }
}

/// Manager without the default catalogue, driven by `client`
#[allow(dead_code)]
pub async fn empty_manager(client: Arc<ScriptedClient>) -> FhirTestManager {
    FhirTestManager::with_client(FhirTestConfig::default().with_default_tests(false), client).await
}
