// HTTP client behaviour against a mock FHIR server

use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use octofhir_fhirtest::{
    AuthConfig, ClientConfig, HttpResourceClient, Operation, ResourceClient, ResourceRequest,
    SearchParam, TestEnvironment,
};

fn environment(server: &MockServer) -> TestEnvironment {
    TestEnvironment::parse("mock", &format!("{}/fhir", server.uri()))
        .unwrap()
        .with_client_id("fhirtest-suite/1.0")
}

fn request(operation: Operation, target: &str) -> ResourceRequest {
    ResourceRequest {
        operation,
        path: target.to_string(),
        query: Vec::new(),
        body: None,
        timeout: None,
    }
}

fn client() -> HttpResourceClient {
    HttpResourceClient::new(ClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_read_sends_fhir_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .and(header("accept", "application/fhir+json"))
        .and(header("user-agent", "fhirtest-suite/1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"resourceType": "CapabilityStatement", "fhirVersion": "4.0.1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client()
        .send(&environment(&server), &request(Operation::Read, "metadata"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["resourceType"], "CapabilityStatement");
    assert!(response.size_bytes > 0);
}

#[tokio::test]
async fn test_search_appends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/Patient"))
        .and(query_param("_count", "5"))
        .and(query_param("family", "Chalmers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut search = request(Operation::Search, "Patient");
    search.query = vec![
        SearchParam::new("_count", "5"),
        SearchParam::new("family", "Chalmers"),
    ];

    let response = client()
        .send(&environment(&server), &search)
        .await
        .unwrap();
    assert_eq!(response.body["type"], "searchset");
}

#[tokio::test]
async fn test_create_posts_json_body() {
    let server = MockServer::start().await;
    let patient = json!({"resourceType": "Patient", "gender": "male"});

    Mock::given(method("POST"))
        .and(path("/fhir/Patient"))
        .and(header("content-type", "application/fhir+json"))
        .and(body_json(&patient))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"resourceType": "Patient", "id": "123", "gender": "male"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut create = request(Operation::Create, "Patient");
    create.body = Some(patient);

    let response = client()
        .send(&environment(&server), &create)
        .await
        .unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(response.body["id"], "123");
}

#[tokio::test]
async fn test_update_and_delete_methods() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/fhir/Patient/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceType": "Patient"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/fhir/Patient/123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let env = environment(&server);
    let client = client();

    let mut update = request(Operation::Update, "Patient/123");
    update.body = Some(json!({"resourceType": "Patient", "id": "123"}));
    assert_eq!(client.send(&env, &update).await.unwrap().status, 200);

    let deleted = client
        .send(&env, &request(Operation::Delete, "Patient/123"))
        .await
        .unwrap();
    assert_eq!(deleted.status, 204);
    assert_eq!(deleted.body, Value::Null);
    assert_eq!(deleted.size_bytes, 0);
}

#[tokio::test]
async fn test_bearer_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/Patient/1"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceType": "Patient"})))
        .expect(1)
        .mount(&server)
        .await;

    let env = environment(&server).with_auth(AuthConfig::Bearer {
        token: "secret-token".to_string(),
    });
    let response = client()
        .send(&env, &request(Operation::Read, "Patient/1"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_basic_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/Patient/1"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceType": "Patient"})))
        .expect(1)
        .mount(&server)
        .await;

    let env = environment(&server).with_auth(AuthConfig::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    });
    let response = client()
        .send(&env, &request(Operation::Read, "Patient/1"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_error_status_is_still_a_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/Patient/unknown"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "error", "code": "not-found"}]
        })))
        .mount(&server)
        .await;

    let response = client()
        .send(&environment(&server), &request(Operation::Read, "Patient/unknown"))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body["resourceType"], "OperationOutcome");
}

#[tokio::test]
async fn test_malformed_body_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not fhir</html>"))
        .mount(&server)
        .await;

    let err = client()
        .send(&environment(&server), &request(Operation::Read, "metadata"))
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(200));
    assert!(err.message.contains("Malformed response body"));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let slow = request(Operation::Read, "metadata").with_timeout(Duration::from_millis(50));
    let err = client()
        .send(&environment(&server), &slow)
        .await
        .unwrap_err();

    assert_eq!(err.message, "request timed out");
}

#[tokio::test]
async fn test_connection_failure() {
    let env = TestEnvironment::parse("offline", "http://127.0.0.1:1/fhir").unwrap();

    let err = client()
        .send(&env, &request(Operation::Read, "metadata"))
        .await
        .unwrap_err();

    assert!(err.status.is_none());
    assert!(err.source.is_some());
}
