//! Relay handler — forwards a plain-text message to the completion service
//! and sends the first candidate back to the same chat.
//!
//! Completion failures never escape this handler: they are logged and the
//! user gets [`FALLBACK_REPLY`]. Only transport errors are returned.

use tracing::{debug, warn};

use crate::llm::{CompletionRequest, CompletionResult, CompletionService, ProviderError};
use crate::subsystems::comms::{ChatTransport, TransportError};
use super::{InboundMessage, RelayState};

/// Output cap sent with every completion request.
pub const MAX_OUTPUT_TOKENS: u32 = 50;

/// Sent when the completion call fails or yields no candidates.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again later.";

/// Sent when the first candidate is blank after trimming.
pub const EMPTY_REPLY: &str = "(empty response)";

/// Relay `message.text` through the completion service.
///
/// Blank text is ignored: no completion call and no reply.
pub async fn handle_message<C, T>(
    state: &RelayState<C>,
    transport: &T,
    message: &InboundMessage,
) -> Result<(), TransportError>
where
    C: CompletionService,
    T: ChatTransport,
{
    if message.text.trim().is_empty() {
        debug!(chat_id = %message.chat_id, "ignoring blank message");
        return Ok(());
    }

    let request = CompletionRequest::new(message.text.clone(), MAX_OUTPUT_TOKENS);
    debug!(chat_id = %message.chat_id, prompt_len = request.prompt.len(), "relaying message");

    let outcome = state.completion.complete(&request).await;
    let reply = reply_for(outcome);

    transport.send_text(message.chat_id, &reply).await
}

/// Turn a completion outcome into the text sent back to the chat.
pub fn reply_for(outcome: Result<CompletionResult, ProviderError>) -> String {
    match outcome {
        Ok(result) => match result.first() {
            Some(candidate) => {
                let text = candidate.trim();
                if text.is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    text.to_string()
                }
            }
            None => {
                warn!("completion returned no candidates");
                FALLBACK_REPLY.to_string()
            }
        },
        Err(e) => {
            warn!(error = %e, "completion failed");
            FALLBACK_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(items: &[&str]) -> Result<CompletionResult, ProviderError> {
        Ok(CompletionResult { candidates: items.iter().map(|s| s.to_string()).collect() })
    }

    #[test]
    fn first_candidate_trimmed() {
        assert_eq!(reply_for(candidates(&["  4  "])), "4");
        assert_eq!(reply_for(candidates(&["\n\nParis.\n", "London"])), "Paris.");
    }

    #[test]
    fn inner_whitespace_kept() {
        assert_eq!(reply_for(candidates(&[" two\nlines "])), "two\nlines");
    }

    #[test]
    fn no_candidates_falls_back() {
        assert_eq!(reply_for(candidates(&[])), FALLBACK_REPLY);
    }

    #[test]
    fn blank_candidate_uses_placeholder() {
        assert_eq!(reply_for(candidates(&["   \n"])), EMPTY_REPLY);
    }

    #[test]
    fn provider_error_falls_back() {
        let err = ProviderError::Request("HTTP 401 Unauthorized: bad key".into());
        assert_eq!(reply_for(Err(err)), FALLBACK_REPLY);
    }
}
