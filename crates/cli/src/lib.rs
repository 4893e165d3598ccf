//! CLI tool for exercising the dispatch core.
//!
//! Provides commands for:
//! - Broadcasting a text message to an in-memory group
//! - Sending a text message to one member
//! - Printing what each member received, with source and target identity

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
