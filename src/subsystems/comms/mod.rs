//! Comms subsystem — the chat transport side of the bot.
//!
//! # Architecture
//!
//! Handlers only see the [`ChatTransport`] capability (`send_text`). Each
//! concrete channel (Telegram today) implements [`runtime::Component`],
//! converts platform messages into [`InboundEvent`]s, runs them through the
//! shared [`Router`], and provides its own `ChatTransport` for the replies.
//!
//! # Starting
//!
//! [`start`] is synchronous — it returns a [`SubsystemHandle`] as soon as
//! the channel tasks are spawned. The caller decides when to await it.
//!
//! [`runtime::Component`]: crate::subsystems::runtime::Component
//! [`InboundEvent`]: crate::subsystems::handlers::InboundEvent

#[cfg(feature = "channel-telegram")]
pub mod telegram;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::llm::CompletionService;
use crate::subsystems::handlers::{ChatId, RelayState, Router};
use crate::subsystems::runtime::{Component, SubsystemHandle, spawn_components};

/// Telegram has a 4096 character limit per message.
/// We chunk at 4000 to be safe.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

// ── Transport capability ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send to chat {chat_id} failed: {reason}")]
    Send { chat_id: ChatId, reason: String },
}

/// Outbound half of a chat transport.
pub trait ChatTransport: Send + Sync {
    /// Deliver `text` to `chat_id`. Long texts may be split by the transport.
    fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Split `text` into pieces of at most `max_chars` characters (not bytes),
/// preserving order. Empty input yields no chunks.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

// ── start ─────────────────────────────────────────────────────────────────────

/// Spawn all configured channels and return a [`SubsystemHandle`].
///
/// Fails up front if an enabled channel is missing its credentials. If any
/// channel exits with an error the shared `shutdown` token is cancelled so
/// siblings stop cooperatively.
pub fn start<C: CompletionService>(
    config: &Config,
    state: Arc<RelayState<C>>,
    router: Arc<Router>,
    shutdown: CancellationToken,
) -> Result<SubsystemHandle, AppError> {
    let mut components: Vec<Box<dyn Component>> = Vec::new();

    #[cfg(feature = "channel-telegram")]
    {
        if config.comms_telegram_should_load() {
            let token = config.telegram_token()?.to_string();
            info!("loading telegram channel");
            components.push(Box::new(telegram::TelegramChannel::new(
                "telegram0",
                token,
                state.clone(),
                router.clone(),
            )));
        }
    }
    #[cfg(not(feature = "channel-telegram"))]
    let _ = (config, &state, &router);

    if components.is_empty() {
        warn!("no comms channels configured — nothing to relay");
    }

    Ok(spawn_components(components, shutdown))
}
