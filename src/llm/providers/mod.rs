//! Completion provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_completions;

use crate::config::{LLM_API_KEY_ENV, LlmConfig};
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `OPENAI_API_KEY` (never TOML). It is required
/// for the `openai` provider and ignored by `dummy`.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" => {
            let api_key = api_key.ok_or(ProviderError::MissingApiKey(LLM_API_KEY_ENV))?;
            let oai = &config.openai;
            let p = openai_completions::OpenAiCompletionsProvider::new(
                oai.api_url.clone(),
                oai.model.clone(),
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAi(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
