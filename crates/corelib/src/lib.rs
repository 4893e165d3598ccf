//! Core library for transport-agnostic group message dispatch.
//!
//! This crate provides the fundamental abstractions shared by every transport:
//! - Peer identifiers and keyed messages
//! - Sender capabilities (unicast, broadcast, lifecycle)
//! - The dispatch base that validates and tags messages before handing them
//!   to transport hooks
//! - A single I/O-class error type

pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod peer;
pub mod sender;

pub use config::DispatchConfig;
pub use dispatch::{Dispatcher, LifecycleState, TransportHooks};
pub use error::{Error, Result};
pub use message::{ElementValue, Message, SOURCE_PEER_ID_TAG, TARGET_PEER_ID_TAG};
pub use peer::PeerId;
pub use sender::{Lifecycle, MessageSender, MulticastMessageSender};
