//! Inbound event handling — the only logic between the chat transport and
//! the completion service.
//!
//! ```text
//! transport ──InboundEvent──▶ Router ──▶ greeting::handle_start
//!                                   └──▶ relay::handle_message ──▶ CompletionService
//! ```
//!
//! Handlers are stateless: everything they need arrives through the shared,
//! read-only [`RelayState`] and the transport passed to each call.

pub mod greeting;
pub mod relay;
pub mod router;

pub use router::{Handler, Route, Router};

use std::fmt;

use crate::llm::CompletionService;

// ── Inbound types ─────────────────────────────────────────────────────────────

/// Transport chat identifier (Telegram uses signed 64-bit ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound text message. Lives for the duration of a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub sender_display_name: String,
    pub text: String,
}

/// A transport-neutral inbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Lower-cased command name without `/`, `@botname` or arguments;
    /// `None` for plain text.
    pub command: Option<String>,
    pub message: InboundMessage,
}

impl InboundEvent {
    /// Build an event from raw message text, recognising `/command` syntax.
    pub fn from_text(
        chat_id: ChatId,
        sender_display_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let command = parse_command(&text);
        Self {
            command,
            message: InboundMessage {
                chat_id,
                sender_display_name: sender_display_name.into(),
                text,
            },
        }
    }

    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}

/// Longest command name Telegram recognises as a bot command.
const MAX_COMMAND_LEN: usize = 32;

/// `/start@my_bot extra` → `Some("start")`.
///
/// Follows Telegram's `bot_command` entity rules: the name right after the
/// leading `/` must be 1–32 ASCII letters, digits or underscores. Anything
/// else (`/`, `/?`, `/etc/hosts`, `/привет`) is plain text.
fn parse_command(text: &str) -> Option<String> {
    let rest = text.strip_prefix('/')?;
    let token = rest.split(char::is_whitespace).next()?;
    let (name, mention) = match token.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (token, None),
    };
    let valid_name = !name.is_empty()
        && name.len() <= MAX_COMMAND_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let valid_mention = mention
        .is_none_or(|m| !m.is_empty() && m.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if !valid_name || !valid_mention {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

// ── Shared state ──────────────────────────────────────────────────────────────

/// Read-only state shared by every handler invocation.
///
/// Built once at startup and wrapped in an `Arc`; holds no mutable data, so
/// independent chats can be served concurrently.
#[derive(Debug)]
pub struct RelayState<C> {
    pub completion: C,
}

impl<C: CompletionService> RelayState<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }
}
