//! `/start` handler — static greeting, no completion call.

use tracing::debug;

use crate::subsystems::comms::{ChatTransport, TransportError};
use super::InboundMessage;

pub const START_COMMAND: &str = "start";

pub fn greeting_text(display_name: &str) -> String {
    format!("Hello, {display_name}! I am your AI bot. How can I assist you today?")
}

/// Send the greeting to the chat the command came from.
/// Transport failures are returned to the caller untouched.
pub async fn handle_start<T: ChatTransport>(
    transport: &T,
    message: &InboundMessage,
) -> Result<(), TransportError> {
    debug!(chat_id = %message.chat_id, "sending greeting");
    transport
        .send_text(message.chat_id, &greeting_text(&message.sender_display_name))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_mentions_name() {
        assert_eq!(
            greeting_text("Ada"),
            "Hello, Ada! I am your AI bot. How can I assist you today?"
        );
    }
}
