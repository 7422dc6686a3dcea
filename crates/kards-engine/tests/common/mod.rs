//! Common test utilities for kards-engine workflow tests.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use kards_engine::capture::{Camera, CaptureError, Facing, VideoStream};
use kards_engine::{CardStore, Engine, ExtractionClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

/// Start a new mock server for testing.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Create an Engine with an in-memory store connected to the mock server.
pub fn engine_for_mock(server: &MockServer) -> Engine {
    engine_with_store(server, CardStore::in_memory())
}

/// Create an Engine with the given store connected to the mock server.
#[allow(dead_code)]
pub fn engine_with_store(server: &MockServer, store: CardStore) -> Engine {
    let client = ExtractionClient::builder()
        .url(server.uri())
        .model("test-model")
        .api_key("test-key")
        .build();
    Engine::new(client, store)
}

/// A successful extraction response whose text is the given JSON value.
pub fn mock_fields_response(fields: serde_json::Value) -> ResponseTemplate {
    mock_text_response(&fields.to_string())
}

/// A successful extraction response carrying raw text.
pub fn mock_text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

/// Mount the extraction endpoint (expect exactly 1 call).
pub async fn mock_extract(server: &MockServer, response: ResponseTemplate) {
    mock_extract_times(server, response, 1).await;
}

/// Mount the extraction endpoint with an expected call count.
pub async fn mock_extract_times(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-model:generateContent"))
        .respond_with(response)
        .expect(Times::from(times))
        .mount(server)
        .await;
}

/// A small solid-colour image.
pub fn sample_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 20, Rgb([200, 180, 90])))
}

/// The sample image as PNG file bytes.
pub fn sample_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    sample_image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// A camera that serves the sample image and counts how often it is stopped.
#[allow(dead_code)] // Not all test files use this
pub struct TestCamera {
    pub available: bool,
    pub opened: Arc<AtomicUsize>,
    pub stopped: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl TestCamera {
    pub fn new() -> Self {
        Self {
            available: true,
            opened: Arc::new(AtomicUsize::new(0)),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct TestStream {
    stopped: Arc<AtomicUsize>,
}

impl VideoStream for TestStream {
    fn frame(&mut self) -> Result<DynamicImage, CaptureError> {
        Ok(sample_image())
    }

    fn stop(&mut self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

impl Camera for TestCamera {
    fn open(&self, _facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError> {
        if !self.available {
            return Err(CaptureError::CameraUnavailable("no device".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestStream {
            stopped: Arc::clone(&self.stopped),
        }))
    }
}
