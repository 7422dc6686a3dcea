//! Common test utilities for extraction client tests.

use kards::ExtractionClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Model name used by every test client.
pub const TEST_MODEL: &str = "test-model";

/// Start a new mock server for testing.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Create a client pointed at the mock server.
pub fn client_for_mock(server: &MockServer) -> ExtractionClient {
    ExtractionClient::builder()
        .url(server.uri())
        .model(TEST_MODEL)
        .api_key("test-key")
        .build()
}

/// A successful generateContent response carrying the given text.
pub fn mock_text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    }))
}

/// A service error response.
#[allow(dead_code)] // Not all test files use this
pub fn mock_service_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": { "code": status, "message": message, "status": "INVALID_ARGUMENT" }
    }))
}

/// Mount a mock for the generateContent endpoint (expect exactly 1 call).
pub async fn mock_generate(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", TEST_MODEL)))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}
