//! Telegram comms channel — long-polls the Bot API, routes each text message
//! through the [`Router`], and replies in the originating chat.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ChatId as TgChatId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::llm::CompletionService;
use crate::subsystems::handlers::{ChatId, InboundEvent, RelayState, Router};
use crate::subsystems::runtime::{Component, ComponentFuture};
use super::{ChatTransport, MAX_MESSAGE_LENGTH, TransportError, chunk_text};

/// Used when a message has no sender (e.g. channel posts).
const UNKNOWN_SENDER_NAME: &str = "there";

// ── TelegramTransport ─────────────────────────────────────────────────────────

/// [`ChatTransport`] backed by a teloxide [`Bot`]. Cheap to clone.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        for chunk in chunk_text(text, MAX_MESSAGE_LENGTH) {
            self.bot
                .send_message(TgChatId(chat_id.0), chunk)
                .await
                .map_err(|e| TransportError::Send { chat_id, reason: e.to_string() })?;
        }
        Ok(())
    }
}

// ── TelegramChannel ───────────────────────────────────────────────────────────

/// A Telegram channel instance.
pub struct TelegramChannel<C> {
    channel_id: String,
    token: String,
    state: Arc<RelayState<C>>,
    router: Arc<Router>,
}

impl<C: CompletionService> TelegramChannel<C> {
    pub fn new(
        channel_id: impl Into<String>,
        token: String,
        state: Arc<RelayState<C>>,
        router: Arc<Router>,
    ) -> Self {
        Self { channel_id: channel_id.into(), token, state, router }
    }
}

impl<C: CompletionService> Component for TelegramChannel<C> {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        let this = *self;
        Box::pin(run_telegram(this.channel_id, this.token, this.state, this.router, shutdown))
    }
}

/// Convert a Telegram message into an [`InboundEvent`]; `None` for non-text.
pub fn inbound_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    let sender = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or(UNKNOWN_SENDER_NAME);
    Some(InboundEvent::from_text(ChatId(msg.chat.id.0), sender, text))
}

// ── run_telegram ──────────────────────────────────────────────────────────────

async fn run_telegram<C: CompletionService>(
    channel_id: String,
    token: String,
    state: Arc<RelayState<C>>,
    router: Arc<Router>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!(%channel_id, "telegram channel starting");

    let bot = Bot::new(token);
    let channel_id_clone = channel_id.clone();

    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let state = state.clone();
        let router = router.clone();
        let channel_id = channel_id_clone.clone();
        async move {
            let Some(event) = inbound_event(&msg) else {
                debug!(%channel_id, chat_id = msg.chat.id.0, "ignoring non-text message");
                return respond(());
            };
            debug!(
                %channel_id,
                chat_id = msg.chat.id.0,
                command = ?event.command,
                "telegram received message"
            );

            let transport = TelegramTransport::new(bot);
            if let Err(e) = router.dispatch(&*state, &transport, &event).await {
                warn!(%channel_id, error = %e, "failed to send telegram reply");
            }
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler).build();

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received — closing telegram channel");
        }
        _ = dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    Ok(())
}
