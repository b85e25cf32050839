//! chatctl - command-line client for chatd

pub mod client;
pub mod commands;

pub use client::{ChatdClient, DEFAULT_URL};
