//! Subsystems wired together by `main`.
//!
//! - **comms** — chat transports (Telegram) and the `ChatTransport` capability.
//! - **handlers** — inbound event routing, greeting and relay handlers.
//! - **runtime** — generic component spawning and shutdown propagation.

pub mod comms;
pub mod handlers;
pub mod runtime;
