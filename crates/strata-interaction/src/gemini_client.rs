//! GeminiClient - Direct REST API implementation for Gemini.
//!
//! Implements the `ModelProvider` boundary over `models/{model}:generateContent`.
//! Schema-constrained output maps to `generationConfig.responseSchema`; search
//! augmentation maps to the `googleSearch` tool and returns grounding sources.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use strata_core::provider::{
    GroundingSource, InlineImage, ModelProvider, ModelRequest, ModelResponse, ProviderError,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Provider implementation that talks to the Gemini HTTP API.
///
/// The key is injected at construction. A client without a key can be built
/// so the rest of the application starts; every call then fails with
/// `ProviderError::MissingCredential`.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("has_api_key", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Creates a client with the given key and per-request timeout.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(None, format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Overrides the endpoint root, e.g. for a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_request(
        &self,
        api_key: &str,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<ModelResponse, ProviderError> {
        let url = format!("{}/{model}:generateContent", self.base_url);

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let kind = if err.is_timeout() { "timed out" } else { "failed" };
                ProviderError::transport(None, format!("Gemini API request {kind}: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ProviderError::transport(None, format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_response(parsed)
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;
        request.validate()?;

        tracing::debug!(
            "Gemini request: model={}, images={}, schema={}, search={}",
            request.model,
            request.images.len(),
            request.response_schema.is_some(),
            request.search_augmentation
        );

        let body = GenerateContentRequest::from_request(&request);
        let response = self.send_request(api_key, &request.model, &body).await?;

        tracing::debug!(
            "Gemini response: {} chars, {} grounding sources",
            response.text.len(),
            response.grounding.len()
        );
        Ok(response)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl GenerateContentRequest {
    fn from_request(request: &ModelRequest) -> Self {
        let mut parts: Vec<Part> = request.images.iter().map(Part::from).collect();
        parts.push(Part::Text {
            text: request.user_text.clone(),
        });

        let system_instruction = request
            .system_instruction
            .as_ref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| Content {
                role: "system".to_string(),
                parts: vec![Part::Text { text: text.clone() }],
            });

        let generation_config = GenerationConfig {
            response_mime_type: request
                .response_schema
                .as_ref()
                .map(|_| "application/json".to_string()),
            response_schema: request.response_schema.clone(),
            thinking_config: request.thinking_budget.map(|thinking_budget| ThinkingConfig {
                thinking_budget,
            }),
        };

        let tools = if request.search_augmentation {
            vec![Tool {
                google_search: serde_json::Map::new(),
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            system_instruction,
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
            tools,
        }
    }
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl From<&InlineImage> for Part {
    fn from(image: &InlineImage) -> Self {
        Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.response_mime_type.is_none()
            && self.response_schema.is_none()
            && self.thinking_config.is_none()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_response(response: GenerateContentResponse) -> Result<ModelResponse, ProviderError> {
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or(ProviderError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    let mut grounding: Vec<GroundingSource> = Vec::new();
    let chunks = candidate
        .grounding_metadata
        .map(|metadata| metadata.grounding_chunks)
        .unwrap_or_default();
    for web in chunks.into_iter().filter_map(|chunk| chunk.web) {
        let Some(uri) = web.uri.filter(|uri| !uri.is_empty()) else {
            continue;
        };
        if grounding.iter().any(|source| source.uri == uri) {
            continue;
        }
        let title = web.title.unwrap_or_else(|| uri.clone());
        grounding.push(GroundingSource { uri, title });
    }

    Ok(ModelResponse { text, grounding })
}

fn map_http_error(status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    ProviderError::transport(Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_request_body() {
        let request = ModelRequest::new("gemini-test", "Analyze this")
            .with_system_instruction("You are a CSO")
            .with_images(vec![InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            }])
            .with_response_schema(json!({"type": "OBJECT"}));

        let body = serde_json::to_value(GenerateContentRequest::from_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                        {"text": "Analyze this"}
                    ]
                }],
                "system_instruction": {"role": "system", "parts": [{"text": "You are a CSO"}]},
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })
        );
    }

    #[test]
    fn test_search_request_body() {
        let request = ModelRequest::new("gemini-test", "Formulate")
            .with_search_augmentation()
            .with_thinking_budget(0);

        let body = serde_json::to_value(GenerateContentRequest::from_request(&request)).unwrap();
        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
        assert_eq!(
            body["generationConfig"],
            json!({"thinkingConfig": {"thinkingBudget": 0}})
        );
        assert!(body.get("system_instruction").is_none());
    }

    #[test]
    fn test_extract_response_with_grounding() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "planning...", "thought": true},
                    {"text": "## Diagnosis\n"},
                    {"text": "Share is eroding"}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"uri": "https://a.example", "title": "A again"}},
                    {"web": {"uri": "https://b.example"}},
                    {"retrievedContext": {}}
                ]}
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let response = extract_response(parsed).unwrap();

        assert_eq!(response.text, "## Diagnosis\nShare is eroding");
        assert_eq!(
            response.grounding,
            vec![
                GroundingSource {
                    uri: "https://a.example".to_string(),
                    title: "A".to_string()
                },
                GroundingSource {
                    uri: "https://b.example".to_string(),
                    title: "https://b.example".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_candidates_are_an_error() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(extract_response(parsed), Err(ProviderError::EmptyResponse));

        let parsed: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": []}}]})).unwrap();
        assert_eq!(extract_response(parsed), Err(ProviderError::EmptyResponse));
    }

    #[test]
    fn test_map_http_error() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string()),
            ProviderError::transport(Some(429), "RESOURCE_EXHAUSTED: Quota exceeded")
        );
        assert_eq!(
            map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string()),
            ProviderError::transport(Some(502), "upstream down")
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let client = GeminiClient::new(Some("   ".to_string()), Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        assert!(!client.has_api_key());

        let err = client
            .generate(ModelRequest::new("gemini-test", "hi"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::MissingCredential);
    }
}
