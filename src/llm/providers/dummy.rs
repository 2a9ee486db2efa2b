//! Dummy provider — echoes the prompt back prefixed with `[echo]`.
//! Lets the bot run end to end without a completion account.

use crate::llm::{CompletionRequest, CompletionResult, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ProviderError> {
        Ok(CompletionResult {
            candidates: vec![format!("[echo] {}", request.prompt)],
        })
    }
}
