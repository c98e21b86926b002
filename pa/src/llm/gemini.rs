//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the Generative Language API
//! (`generateContent`). Blocking request/response only.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::{ApiKey, LlmConfig};

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: ApiKey,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client bound to one model
    pub fn from_config(config: &LlmConfig, api_key: ApiKey, model: impl Into<String>) -> Result<Self, LlmError> {
        let model = model.into();
        debug!(%model, base_url = %config.base_url, timeout_ms = ?config.timeout_ms, "from_config: called");

        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().map_err(LlmError::Network)?;

        Ok(Self {
            model,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(message_count = %request.messages.len(), %request.max_tokens, "build_request_body: called");

        let contents: Vec<_> = request
            .messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role.as_gemini(),
                    "parts": [{ "text": msg.content }],
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": request.system_prompt }],
            },
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
            },
        });

        if let Some(temperature) = request.temperature {
            body["generationConfig"]["temperature"] = serde_json::json!(temperature);
        }

        body
    }

    /// Parse the Gemini API response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<CompletionResponse, LlmError> {
        if let Some(reason) = api_response.prompt_feedback.and_then(|f| f.block_reason) {
            debug!(%reason, "parse_response: prompt blocked");
            return Err(LlmError::Blocked(format!("prompt blocked ({reason})")));
        }

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".to_string()))?;

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        let stop_reason = StopReason::from_gemini(&finish_reason);

        let content: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();

        if content.is_empty() {
            debug!(%finish_reason, "parse_response: no text in candidate");
            return Err(match stop_reason {
                StopReason::Blocked => LlmError::Blocked(format!("reply blocked ({finish_reason})")),
                _ => LlmError::InvalidResponse(format!("empty reply (finish reason: {finish_reason})")),
            });
        }

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            stop_reason,
            usage,
        })
    }
}

/// Decode a success body; anything that is not a `GenerateContentResponse` is invalid
fn decode_response(body: &str) -> Result<GeminiResponse, LlmError> {
    serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(format!("malformed response body: {e}")))
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.model, "complete: called");
        let url = format!("{}:generateContent", self.model_url());
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 429 {
            warn!("complete: rate limited (429)");
            return Err(LlmError::RateLimited);
        }

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "complete: API error");
            return Err(LlmError::ApiError {
                status,
                message: error_message(&text),
            });
        }

        let text = response.text().await?;
        let api_response = decode_response(&text)?;

        let parsed = self.parse_response(api_response)?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            stop_reason = ?parsed.stop_reason,
            "complete: success"
        );
        Ok(parsed)
    }

    async fn check_model(&self) -> Result<(), LlmError> {
        debug!(model = %self.model, "check_model: called");
        let response = self
            .http
            .get(self.model_url())
            .header("x-goog-api-key", self.api_key.expose())
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(LlmError::RateLimited);
        }
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status,
                message: error_message(&text),
            });
        }
        Ok(())
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}
