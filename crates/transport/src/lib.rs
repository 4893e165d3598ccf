//! Concrete transports for the dispatch core.
//!
//! This crate provides:
//! - An in-process, shared-memory group network
//! - Endpoint configuration

pub mod config;
pub mod memory;

pub use config::TransportConfig;
pub use memory::{Mailbox, MemoryNetwork, MemoryTransport};
