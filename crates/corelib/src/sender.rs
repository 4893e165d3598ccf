//! Caller-facing sender capabilities.
//!
//! The group-membership layer talks to a transport only through these
//! traits. Missing arguments are expressed as `None` and rejected with
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument).
//!
//! # Return values
//!
//! `Ok(false)` means the transport could not fully deliver the message but
//! chose not to treat that as an error. Callers must check both the error and
//! the boolean.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;
use crate::peer::PeerId;

/// Start/stop hooks shared by every sender.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Acquire transport resources.
    async fn start(&self) -> Result<()>;

    /// Release transport resources.
    async fn stop(&self) -> Result<()>;
}

/// Unicast: deliver a message to exactly one named peer.
#[async_trait]
pub trait MessageSender: Lifecycle {
    /// Send `message` to `peer_id`.
    ///
    /// # Errors
    ///
    /// Fails if either argument is missing, or if the transport reports an
    /// I/O-class failure.
    async fn send(&self, peer_id: Option<&PeerId>, message: Option<&mut Message>) -> Result<bool>;
}

/// Broadcast: deliver a message to every member of the group.
#[async_trait]
pub trait MulticastMessageSender: Lifecycle {
    /// Broadcast `message` to all members.
    ///
    /// # Errors
    ///
    /// Fails if `message` is missing, or if the transport reports an
    /// I/O-class failure.
    async fn broadcast(&self, message: Option<&mut Message>) -> Result<bool>;
}
