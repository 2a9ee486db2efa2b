//! Relay bot library — exposes the handlers, router and providers so the
//! binary and the integration tests share one implementation.
//! The binary entry point is src/main.rs.

pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod subsystems;
