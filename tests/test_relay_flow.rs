//! End-to-end handler tests: router → handler → stub completion → recording transport.

use std::sync::Mutex;

use relay_bot::llm::{CompletionRequest, CompletionResult, CompletionService, ProviderError};
use relay_bot::subsystems::comms::{ChatTransport, TransportError};
use relay_bot::subsystems::handlers::relay::{FALLBACK_REPLY, MAX_OUTPUT_TOKENS};
use relay_bot::subsystems::handlers::{ChatId, Handler, InboundEvent, RelayState, Router};

// ── Test doubles ──────────────────────────────────────────────────────────────

/// Returns the same outcome for every request and records what it was asked.
struct ScriptedCompletion {
    outcome: Result<Vec<&'static str>, &'static str>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    fn candidates(items: &[&'static str]) -> Self {
        Self { outcome: Ok(items.to_vec()), requests: Mutex::new(Vec::new()) }
    }

    fn failing(reason: &'static str) -> Self {
        Self { outcome: Err(reason), requests: Mutex::new(Vec::new()) }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.outcome {
            Ok(items) => Ok(CompletionResult {
                candidates: items.iter().map(|s| s.to_string()).collect(),
            }),
            Err(reason) => Err(ProviderError::Request(reason.to_string())),
        }
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

struct BrokenTransport;

impl ChatTransport for BrokenTransport {
    async fn send_text(&self, chat_id: ChatId, _text: &str) -> Result<(), TransportError> {
        Err(TransportError::Send { chat_id, reason: "network down".into() })
    }
}

fn event(chat: i64, name: &str, text: &str) -> InboundEvent {
    InboundEvent::from_text(ChatId(chat), name, text)
}

// ── Greeting ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_greets_sender_by_name() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["unused"]));
    let transport = RecordingTransport::default();

    let handled = Router::default()
        .dispatch(&state, &transport, &event(42, "Ada", "/start"))
        .await
        .unwrap();

    assert_eq!(handled, Some(Handler::Greeting));
    assert_eq!(
        transport.sent(),
        vec![(ChatId(42), "Hello, Ada! I am your AI bot. How can I assist you today?".to_string())]
    );
    assert!(state.completion.requests().is_empty(), "greeting must not call the completion service");
}

// ── Relay ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn relay_sends_trimmed_first_candidate() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["  4  ", "five"]));
    let transport = RecordingTransport::default();

    let handled = Router::default()
        .dispatch(&state, &transport, &event(7, "Ada", "What is 2+2?"))
        .await
        .unwrap();

    assert_eq!(handled, Some(Handler::Relay));
    assert_eq!(transport.sent(), vec![(ChatId(7), "4".to_string())]);
}

#[tokio::test]
async fn relay_uses_text_as_prompt_with_fixed_cap() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["ok"]));
    let transport = RecordingTransport::default();
    let router = Router::default();
    let long_text = "why ".repeat(500);

    router.dispatch(&state, &transport, &event(1, "Ada", "hi")).await.unwrap();
    router.dispatch(&state, &transport, &event(1, "Ada", &long_text)).await.unwrap();

    let requests = state.completion.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], CompletionRequest::new("hi", 50));
    assert_eq!(requests[1].prompt, long_text);
    assert!(requests.iter().all(|r| r.max_output_tokens == MAX_OUTPUT_TOKENS));
    assert_eq!(MAX_OUTPUT_TOKENS, 50);
}

#[tokio::test]
async fn empty_candidates_send_fallback() {
    let state = RelayState::new(ScriptedCompletion::candidates(&[]));
    let transport = RecordingTransport::default();

    let result = Router::default()
        .dispatch(&state, &transport, &event(3, "Ada", "anyone there?"))
        .await;

    assert!(result.is_ok());
    assert_eq!(transport.sent(), vec![(ChatId(3), FALLBACK_REPLY.to_string())]);
}

#[tokio::test]
async fn completion_failure_sends_fallback() {
    let state = RelayState::new(ScriptedCompletion::failing("HTTP 429: quota exceeded"));
    let transport = RecordingTransport::default();

    Router::default()
        .dispatch(&state, &transport, &event(3, "Ada", "hello"))
        .await
        .unwrap();

    assert_eq!(transport.sent(), vec![(ChatId(3), FALLBACK_REPLY.to_string())]);
}

#[tokio::test]
async fn blank_text_is_ignored() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["x"]));
    let transport = RecordingTransport::default();

    Router::default()
        .dispatch(&state, &transport, &event(3, "Ada", "   "))
        .await
        .unwrap();

    assert!(transport.sent().is_empty());
    assert!(state.completion.requests().is_empty());
}

#[tokio::test]
async fn same_message_twice_gives_two_identical_replies() {
    let state = RelayState::new(ScriptedCompletion::candidates(&[" Paris "]));
    let transport = RecordingTransport::default();
    let router = Router::default();
    let msg = event(9, "Ada", "Capital of France?");

    router.dispatch(&state, &transport, &msg).await.unwrap();
    router.dispatch(&state, &transport, &msg).await.unwrap();

    assert_eq!(state.completion.requests().len(), 2, "no caching across calls");
    assert_eq!(
        transport.sent(),
        vec![(ChatId(9), "Paris".to_string()), (ChatId(9), "Paris".to_string())]
    );
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commands_never_reach_relay() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["x"]));
    let transport = RecordingTransport::default();
    let router = Router::default();

    for text in ["/start", "/help", "/start@relay_bot hi"] {
        router.dispatch(&state, &transport, &event(1, "Ada", text)).await.unwrap();
    }

    assert!(state.completion.requests().is_empty());
    // Only the two /start variants produced a reply; /help is dropped.
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn plain_text_never_reaches_greeting() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["reply"]));
    let transport = RecordingTransport::default();

    Router::default()
        .dispatch(&state, &transport, &event(1, "Ada", "start"))
        .await
        .unwrap();

    assert_eq!(transport.sent(), vec![(ChatId(1), "reply".to_string())]);
}

#[tokio::test]
async fn slash_text_without_command_name_is_relayed() {
    let state = RelayState::new(ScriptedCompletion::candidates(&[" It is a question mark. "]));
    let transport = RecordingTransport::default();

    let handled = Router::default()
        .dispatch(&state, &transport, &event(4, "Ada", "/?"))
        .await
        .unwrap();

    assert_eq!(handled, Some(Handler::Relay));
    assert_eq!(state.completion.requests()[0].prompt, "/?");
    assert_eq!(transport.sent(), vec![(ChatId(4), "It is a question mark.".to_string())]);
}

#[tokio::test]
async fn replies_go_to_originating_chat() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["ok"]));
    let transport = RecordingTransport::default();
    let router = Router::default();

    router.dispatch(&state, &transport, &event(-100123, "Ada", "hi")).await.unwrap();
    router.dispatch(&state, &transport, &event(55, "Bob", "/start")).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].0, ChatId(-100123));
    assert_eq!(sent[1].0, ChatId(55));
    assert!(sent[1].1.contains("Bob"));
}

// ── Transport failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn transport_failure_propagates() {
    let state = RelayState::new(ScriptedCompletion::candidates(&["ok"]));

    let err = Router::default()
        .dispatch(&state, &BrokenTransport, &event(5, "Ada", "/start"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("chat 5"));
    assert!(err.to_string().contains("network down"));
}
