//! OpenAI-compatible text completion provider (`/v1/completions`).
//!
//! All OpenAI wire types are private to this module — callers only see
//! [`CompletionRequest`] and [`CompletionResult`]. The provider is stateless:
//! one HTTP round-trip per call, no retries.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{CompletionRequest, CompletionResult, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing the legacy `/v1/completions`
/// API (OpenAI, vLLM, llama.cpp server, …).
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionsProvider {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompletionsProvider {
    /// Build a provider. `timeout_seconds` bounds each request end to end.
    pub fn new(
        api_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_url, model, api_key })
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ProviderError> {
        let payload = WireRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_output_tokens,
        };

        debug!(
            model = %payload.model,
            max_tokens = payload.max_tokens,
            prompt_len = request.prompt.len(),
            "sending completion request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full completion request payload");
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_url, error = %e, timeout = e.is_timeout(), "completion HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            let message = describe_http_error(status, &body);
            error!(%status, %message, "completion request returned HTTP error");
            return Err(ProviderError::Request(message));
        }

        let parsed = response.json::<WireResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize completion response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        let result = into_result(parsed);
        debug!(candidates = result.candidates.len(), "received completion response");
        Ok(result)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Choices in `index` order; a choice with no `text` becomes an empty candidate.
fn into_result(mut response: WireResponse) -> CompletionResult {
    response.choices.sort_by_key(|c| c.index);
    CompletionResult {
        candidates: response
            .choices
            .into_iter()
            .map(|c| c.text.unwrap_or_default())
            .collect(),
    }
}

fn describe_http_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            let code = env
                .error
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={s}]"),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("HTTP {status}{code}: {}", env.error.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    }
}
