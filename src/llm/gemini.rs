//! Google Gemini provider over the public REST API.
//!
//! Uses `generateContent` for whole responses and
//! `streamGenerateContent?alt=sse` for streamed replies, read through
//! `reqwest-eventsource`.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest_eventsource::{Event, EventSource};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
    TextStream,
};

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> FinishReason {
        match self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => {
                FinishReason::ContentFilter
            }
            _ => FinishReason::Unknown,
        }
    }
}

fn to_wire(request: &CompletionRequest) -> GenerateContentRequest {
    let system_instruction = request.system_instruction().map(|text| Content {
        role: None,
        parts: vec![Part { text }],
    });

    let contents = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m: &ChatMessage| Content {
            role: Some(
                match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
            ),
            parts: vec![Part {
                text: m.content.clone(),
            }],
        })
        .collect();

    GenerateContentRequest {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
            max_output_tokens: request.max_tokens,
        },
    }
}

// ── Streaming ───────────────────────────────────────────────────────

fn parse_stream_payload(payload: &str) -> Result<String, LlmError> {
    let response: GenerateContentResponse =
        serde_json::from_str(payload).map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("bad stream chunk: {e}"),
        })?;
    Ok(response.text())
}

// ── Provider ────────────────────────────────────────────────────────

/// Gemini REST client.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    fn post(&self, url: String, request: &CompletionRequest) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&to_wire(request))
    }

    async fn send(
        &self,
        url: String,
        request: &CompletionRequest,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .post(url, request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(rejected(response).await)
    }
}

/// Map a non-success HTTP response onto the provider error kinds.
async fn rejected(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after = retry_after(response.headers());
    let detail = response.text().await.unwrap_or_default();
    status_error(status, retry_after, detail)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn status_error(status: StatusCode, retry_after: Option<Duration>, detail: String) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
        },
        429 => LlmError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after,
        },
        code => LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("HTTP {code}: {detail}"),
        },
    }
}

async fn stream_error(error: reqwest_eventsource::Error) -> LlmError {
    match error {
        reqwest_eventsource::Error::InvalidStatusCode(_, response) => rejected(response).await,
        other => LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("stream interrupted: {other}"),
        },
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self.send(self.endpoint("generateContent"), &request).await?;
        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                })?;

        let usage = parsed.usage_metadata.as_ref();
        Ok(CompletionResponse {
            content: parsed.text(),
            input_tokens: usage.map(|u| u.prompt_token_count).unwrap_or(0),
            output_tokens: usage.map(|u| u.candidates_token_count).unwrap_or(0),
            finish_reason: parsed.finish_reason(),
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<TextStream, LlmError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let mut source =
            EventSource::new(self.post(url, &request)).map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        // Connection and status failures surface here rather than mid-stream.
        match source.next().await {
            Some(Ok(Event::Open)) => {}
            Some(Err(e)) => {
                source.close();
                return Err(stream_error(e).await);
            }
            Some(Ok(Event::Message(_))) | None => {
                source.close();
                return Err(LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: "event stream did not open".to_string(),
                });
            }
        }

        let stream = futures::stream::unfold(Some(source), |source| async move {
            let mut source = source?;
            loop {
                match source.next().await {
                    Some(Ok(Event::Message(message))) => {
                        let item = parse_stream_payload(&message.data);
                        return Some((item, Some(source)));
                    }
                    Some(Ok(Event::Open)) => continue,
                    Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                        source.close();
                        return None;
                    }
                    Some(Err(e)) => {
                        source.close();
                        return Some((Err(stream_error(e).await), None));
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
