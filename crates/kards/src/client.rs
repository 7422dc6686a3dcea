//! The extraction client and builder.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::request::{ErrorEnvelope, GenerateRequest, GenerateResponse};
use crate::types::{ContactFields, FIELD_NAMES};

/// Default base URL of the extraction service.
const DEFAULT_URL: &str = "https://generativelanguage.googleapis.com";

/// Default vision model.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the AI vision service that reads business cards.
///
/// Each call to [`extract`](Self::extract) is a single attempt; failures are
/// reported, never retried.
///
/// # Example
///
/// ```no_run
/// use kards::ExtractionClient;
///
/// # async fn example(jpeg_base64: &str) -> kards::Result<()> {
/// let client = ExtractionClient::builder()
///     .api_key("my-api-key")
///     .build();
///
/// let fields = client.extract(jpeg_base64).await?;
/// println!("{} at {}", fields.name, fields.company);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ExtractionClient {
    /// Create a builder for client configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract contact fields from a base64-encoded JPEG.
    ///
    /// Returns all seven fields; any the service leaves out are empty.
    pub async fn extract(&self, image_base64: &str) -> Result<ContactFields> {
        let text = self.generate(image_base64).await?;

        if text.is_empty() {
            warn!("extraction service returned no text");
            return Err(Error::EmptyResponse);
        }

        parse_fields(&text).inspect_err(|e| {
            warn!(error = %e, response = %text, "could not parse extraction response");
        })
    }

    /// Send one generateContent request and return the response text.
    async fn generate(&self, image_base64: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("no API key configured".to_string()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let request = GenerateRequest::for_jpeg(image_base64);

        debug!(url = %url, image_len = image_base64.len(), "sending extraction request");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::ConnectionRefused
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(Error::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.text();
        debug!(text_len = text.len(), "received extraction response");
        Ok(text)
    }
}

/// Parse the service's JSON text into contact fields.
///
/// The text must be a JSON object. Missing and `null` fields become empty
/// strings; numbers and booleans keep their textual form.
///
/// # Example
///
/// ```
/// let fields = kards::parse_fields(r#"{"name": "Ann", "phone": null}"#).unwrap();
/// assert_eq!(fields.name, "Ann");
/// assert_eq!(fields.phone, "");
/// assert_eq!(fields.email, "");
/// ```
pub fn parse_fields(text: &str) -> Result<ContactFields> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| Error::MalformedResponse(format!("not valid JSON: {}", e)))?;

    let Value::Object(map) = value else {
        return Err(Error::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let mut fields = ContactFields::default();
    for name in FIELD_NAMES {
        let text = match map.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(_) => {
                return Err(Error::MalformedResponse(format!(
                    "field '{}' is not a string",
                    name
                )));
            }
        };
        if let Some(slot) = fields.get_mut(name) {
            *slot = text;
        }
    }

    Ok(fields)
}

/// Builder for creating a customized [`ExtractionClient`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use kards::ExtractionClient;
///
/// let client = ExtractionClient::builder()
///     .url("https://generativelanguage.googleapis.com")
///     .model("gemini-2.5-flash")
///     .api_key("my-secret-key")
///     .timeout(Duration::from_secs(90))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the service base URL.
    ///
    /// Defaults to `https://generativelanguage.googleapis.com`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model name.
    ///
    /// Defaults to `gemini-2.5-flash`.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 60 seconds.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Build the client.
    pub fn build(self) -> ExtractionClient {
        let http_client = Client::builder()
            .timeout(self.timeout)
            .build()
            .expect("Failed to build HTTP client");

        ExtractionClient {
            http_client,
            base_url: self.base_url,
            model: self.model,
            api_key: self.api_key,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
