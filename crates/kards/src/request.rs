//! Internal request and response types for the generateContent protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::FIELD_NAMES;

/// Instruction sent alongside every card image.
pub(crate) const EXTRACTION_PROMPT: &str = "You are an expert business card scanner. \
Analyze the provided image of a business card and extract the contact information. \
Provide the output in the requested JSON format. If a field is not present on the card, \
return an empty string for that field.";

/// The request body for a single extraction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

/// One part of the request: the inline image or the instruction text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

impl<'a> GenerateRequest<'a> {
    /// Build the request for a base64-encoded JPEG.
    pub fn for_jpeg(image_base64: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data: image_base64,
                        },
                    },
                    Part::Text {
                        text: EXTRACTION_PROMPT,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: card_schema(),
            },
        }
    }
}

/// The response schema: an object of seven required string properties.
pub(crate) fn card_schema() -> Value {
    let descriptions = [
        "The full name of the person.",
        "The job title or position.",
        "The name of the company or organization.",
        "The primary phone number. Include country code if present.",
        "The primary email address.",
        "The company or personal website URL.",
        "The full physical address.",
    ];

    let properties: serde_json::Map<String, Value> = FIELD_NAMES
        .iter()
        .zip(descriptions)
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({ "type": "STRING", "description": description }),
            )
        })
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": FIELD_NAMES,
    })
}

/// The response envelope returned by the service.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, trimmed. Empty when nothing was returned.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest::for_jpeg("QUJD");
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
        assert_eq!(parts[1]["text"], EXTRACTION_PROMPT);

        let config = &json["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["required"].as_array().unwrap().len(), 7);
        assert_eq!(
            config["responseSchema"]["properties"]["phone"]["type"],
            "STRING"
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": " {\"name\":" }, { "text": "\"Ann\"} " }] }
            }]
        }))
        .unwrap();
        assert_eq!(response.text(), "{\"name\":\"Ann\"}");
    }

    #[test]
    fn test_response_text_empty() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), "");

        let response: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
                .unwrap();
        assert_eq!(response.text(), "");
    }
}
