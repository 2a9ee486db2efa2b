//! Explicit event router: an ordered list of `(predicate, handler)` routes.
//! The first matching route wins; events that match nothing are dropped.

use std::fmt;

use tracing::debug;

use crate::llm::CompletionService;
use crate::subsystems::comms::{ChatTransport, TransportError};
use super::{InboundEvent, RelayState, greeting, relay};

/// Which handler a route sends its events to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Greeting,
    Relay,
}

pub type Predicate = fn(&InboundEvent) -> bool;

#[derive(Clone, Copy)]
pub struct Route {
    /// Stable name used in log messages.
    pub name: &'static str,
    pub matches: Predicate,
    pub handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    /// `/start` → greeting, plain text → relay. Other commands are dropped.
    fn default() -> Self {
        Self::new(vec![
            Route { name: "start", matches: is_start_command, handler: Handler::Greeting },
            Route { name: "text", matches: is_plain_text, handler: Handler::Relay },
        ])
    }
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route whose predicate accepts `event`.
    pub fn route(&self, event: &InboundEvent) -> Option<&Route> {
        self.routes.iter().find(|r| (r.matches)(event))
    }

    /// Route `event` and run the selected handler.
    ///
    /// Returns the handler that ran, or `None` if no route matched.
    pub async fn dispatch<C, T>(
        &self,
        state: &RelayState<C>,
        transport: &T,
        event: &InboundEvent,
    ) -> Result<Option<Handler>, TransportError>
    where
        C: CompletionService,
        T: ChatTransport,
    {
        let Some(route) = self.route(event) else {
            debug!(
                chat_id = %event.message.chat_id,
                command = ?event.command,
                "no route for event"
            );
            return Ok(None);
        };

        debug!(chat_id = %event.message.chat_id, route = route.name, "routing event");
        match route.handler {
            Handler::Greeting => greeting::handle_start(transport, &event.message).await?,
            Handler::Relay => relay::handle_message(state, transport, &event.message).await?,
        }
        Ok(Some(route.handler))
    }
}

pub fn is_start_command(event: &InboundEvent) -> bool {
    event.command.as_deref() == Some(greeting::START_COMMAND)
}

pub fn is_plain_text(event: &InboundEvent) -> bool {
    !event.is_command()
}
