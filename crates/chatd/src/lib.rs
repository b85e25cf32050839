//! chatd library - exposes modules for testing.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod routes;
pub mod server;
