//! Gemini Provider
//!
//! Implementation of the InferenceGateway trait for Google's Gemini
//! `generateContent` API. Supports inline image parts, structured JSON output
//! constrained by a response schema, and Google Maps grounding.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::http_client::build_http_client;
use super::provider::{missing_api_key_error, parse_http_error, InferenceGateway};
use super::types::{
    Citation, CitationKind, GenerateRequest, GenerateResponse, GroundingTool, LlmError, LlmResult,
    PromptPart, ProviderConfig, UsageStats,
};

/// Default Gemini API endpoint
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider
pub struct GeminiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(
            config.proxy.as_ref(),
            std::time::Duration::from_secs(config.timeout_secs),
        )?;
        tracing::info!(
            "Gemini provider initialized: model={}, endpoint={}",
            config.model,
            config.base_url.as_deref().unwrap_or(GEMINI_API_URL)
        );
        Ok(Self { config, client })
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_URL)
            .trim_end_matches('/')
    }

    fn build_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url(), model)
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &GenerateRequest) -> serde_json::Value {
        let parts: Vec<serde_json::Value> = request
            .parts
            .iter()
            .map(|part| match part {
                PromptPart::Text { text } => json!({ "text": text }),
                PromptPart::Image { media_type, data } => json!({
                    "inlineData": {
                        "mimeType": media_type,
                        "data": data,
                    }
                }),
            })
            .collect();

        let mut generation_config = json!({
            "temperature": self.config.temperature,
        });
        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        let mut body = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": generation_config,
        });

        if let Some(tool) = request.grounding {
            body["tools"] = match tool {
                GroundingTool::Maps => json!([{ "googleMaps": {} }]),
            };
        }

        body
    }

    /// Parse a response from the Gemini API
    fn parse_response(&self, response: GeminiResponse, model: &str) -> LlmResult<GenerateResponse> {
        if let Some(error) = response.error {
            return Err(LlmError::ServerError {
                message: error.message,
                status: error.code,
            });
        }

        let candidate = response.candidates.and_then(|c| c.into_iter().next());
        let Some(candidate) = candidate else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LlmError::ContentBlocked { reason });
        };

        // Thought parts are reasoning traces, not answer text.
        let text: String = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text)
            .collect();

        let citations = candidate
            .grounding_metadata
            .and_then(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .map(GroundingChunk::into_citation)
            .collect();

        let usage = response
            .usage_metadata
            .map(|u| UsageStats {
                input_tokens: u.prompt_token_count.unwrap_or(0),
                output_tokens: u.candidates_token_count.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(GenerateResponse {
            text: if text.is_empty() { None } else { Some(text) },
            citations,
            usage,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
        })
    }
}

#[async_trait]
impl InferenceGateway for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn supports_multimodal(&self) -> bool {
        true
    }

    fn supports_grounding(&self) -> bool {
        true
    }

    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("gemini"))?;

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let body = self.build_request_body(&request);

        tracing::debug!(
            "Gemini generateContent: model={}, parts={}, schema={}, grounding={:?}",
            model,
            request.parts.len(),
            request.response_schema.is_some(),
            request.grounding
        );

        let response = self
            .client
            .post(self.build_url(&model))
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "gemini"));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let parsed = self.parse_response(gemini_response, &model)?;
        tracing::debug!(
            "Gemini response: model={}, tokens={}, citations={}",
            parsed.model,
            parsed.usage.total_tokens(),
            parsed.citations.len()
        );
        Ok(parsed)
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("gemini"))?;

        let url = format!("{}/models/{}", self.base_url(), self.config.model);
        let response = self
            .client
            .get(url)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, "gemini"))
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

// Gemini API response structures

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
    model_version: Option<String>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGroundingMetadata {
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    maps: Option<GroundingSource>,
    web: Option<GroundingSource>,
}

impl GroundingChunk {
    fn into_citation(self) -> Citation {
        let (kind, source) = match (self.maps, self.web) {
            (Some(maps), _) => (CitationKind::Maps, Some(maps)),
            (None, Some(web)) => (CitationKind::Web, Some(web)),
            (None, None) => (CitationKind::Other, None),
        };
        let (title, uri) = source.map(|s| (s.title, s.uri)).unwrap_or((None, None));
        Citation { kind, title, uri }
    }
}

#[derive(Debug, Deserialize)]
struct GroundingSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    code: Option<u16>,
}
