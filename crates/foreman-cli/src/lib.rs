//! Foreman CLI: search and host lifecycle from the command line.

pub mod commands;
pub mod config;

pub use commands::SearchKind;
pub use config::{resolve_settings, ConnectionArgs, Settings};
