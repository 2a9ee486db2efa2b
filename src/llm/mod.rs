//! Completion provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Handlers depend on the [`CompletionService`] trait rather than on the enum,
//! so tests can plug in scripted stubs. The trait uses return-position
//! `impl Future` so no `async-trait` or boxing is needed.

pub mod providers;

use std::future::Future;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0} is not set")]
    MissingApiKey(&'static str),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Wire-neutral request / result ─────────────────────────────────────────────

/// One prompt submitted for completion. Built fresh for every inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_output_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_output_tokens: u32) -> Self {
        Self { prompt: prompt.into(), max_output_tokens }
    }
}

/// Generated candidates in provider order. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResult {
    pub candidates: Vec<String>,
}

impl CompletionResult {
    pub fn first(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

// ── Capability ────────────────────────────────────────────────────────────────

/// A remote text-completion capability.
pub trait CompletionService: Send + Sync + 'static {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResult, ProviderError>> + Send;
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAi(providers::openai_completions::OpenAiCompletionsProvider),
}

impl LlmProvider {
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::OpenAi(_) => "openai",
        }
    }
}

impl CompletionService for LlmProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(request).await,
            LlmProvider::OpenAi(p) => p.complete(request).await,
        }
    }
}
