//! Dispatch base shared by every transport.
//!
//! # Overview
//!
//! A concrete transport implements [`TransportHooks`], which only knows how to
//! put bytes on the wire (or into a channel, or shared memory). Wrapping it in
//! a [`Dispatcher`] adds the logic every transport needs before transmission:
//!
//! 1. **Validation**: missing arguments fail with
//!    [`Error::InvalidArgument`] and never reach the hook.
//! 2. **Identity tagging**: the local peer id (when set) is attached under
//!    [`SOURCE_PEER_ID_TAG`]; targeted sends additionally attach the
//!    destination under [`TARGET_PEER_ID_TAG`]. Source is always attached
//!    before target.
//! 3. **Delegation**: the hook's boolean and errors are returned unchanged.
//!
//! # Concurrency
//!
//! The dispatcher holds no mutable state beyond the local peer id, which is
//! fixed once the transport is initialised. `broadcast` and `send` take
//! `&self` and may run concurrently whenever the hooks allow it.
//!
//! # Example
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(transport).with_local_peer_id(local);
//! dispatcher.start().await?;
//! let delivered = dispatcher.send(Some(&peer), Some(&mut message)).await?;
//! ```

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::message::{Message, SOURCE_PEER_ID_TAG, TARGET_PEER_ID_TAG};
use crate::peer::PeerId;
use crate::sender::{Lifecycle, MessageSender, MulticastMessageSender};

/// Conceptual lifecycle of a transport.
///
/// The dispatcher never enforces it; transports that want strict lifecycle
/// checks track it themselves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    #[default]
    Stopped,
    Started,
}

/// Transport-specific extension points.
///
/// Implementations perform the actual transmission. They receive messages
/// that have already been validated and tagged.
#[async_trait]
pub trait TransportHooks: Send + Sync {
    /// Transmit `message` to all members of the group.
    ///
    /// # Returns
    /// `true` if every reachable member received it, by the transport's own
    /// definition of "all".
    async fn do_broadcast(&self, message: &mut Message) -> Result<bool>;

    /// Transmit `message` to the single destination `peer_id`.
    async fn do_send(&self, peer_id: &PeerId, message: &mut Message) -> Result<bool>;

    /// Acquire transport resources. No-op by default.
    async fn start(&self) -> Result<()> {
        Ok(())
    }

    /// Release transport resources. No-op by default.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Validates and tags outgoing messages before handing them to `T`.
#[derive(Debug)]
pub struct Dispatcher<T> {
    local_peer_id: Option<PeerId>,
    transport: T,
}

impl<T: TransportHooks> Dispatcher<T> {
    /// Wrap a transport with no local peer id.
    pub fn new(transport: T) -> Self {
        Self {
            local_peer_id: None,
            transport,
        }
    }

    /// Wrap a transport using the identity from `config`.
    pub fn from_config(config: &DispatchConfig, transport: T) -> Self {
        Self {
            local_peer_id: config.local_peer_id.clone(),
            transport,
        }
    }

    /// Builder-style setter for the local peer id.
    pub fn with_local_peer_id(mut self, local_peer_id: PeerId) -> Self {
        self.local_peer_id = Some(local_peer_id);
        self
    }

    /// Assign the local peer id during transport initialisation.
    pub fn set_local_peer_id(&mut self, local_peer_id: Option<PeerId>) {
        self.local_peer_id = local_peer_id;
    }

    pub fn local_peer_id(&self) -> Option<&PeerId> {
        self.local_peer_id.as_ref()
    }

    /// Borrow the wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Unwrap the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn tag_source(&self, message: &mut Message) {
        if let Some(local) = &self.local_peer_id {
            trace!(source = %local, "tagging source peer id");
            message.add_element(SOURCE_PEER_ID_TAG, local.clone());
        }
    }
}

#[async_trait]
impl<T: TransportHooks> Lifecycle for Dispatcher<T> {
    async fn start(&self) -> Result<()> {
        self.transport.start().await
    }

    async fn stop(&self) -> Result<()> {
        self.transport.stop().await
    }
}

#[async_trait]
impl<T: TransportHooks> MulticastMessageSender for Dispatcher<T> {
    async fn broadcast(&self, message: Option<&mut Message>) -> Result<bool> {
        let message = message.ok_or(Error::InvalidArgument(Error::NULL_MESSAGE))?;
        self.tag_source(message);
        debug!(elements = message.len(), "broadcasting message");
        self.transport.do_broadcast(message).await
    }
}

#[async_trait]
impl<T: TransportHooks> MessageSender for Dispatcher<T> {
    async fn send(&self, peer_id: Option<&PeerId>, message: Option<&mut Message>) -> Result<bool> {
        let peer_id = peer_id.ok_or(Error::InvalidArgument(Error::NULL_PEER_ID))?;
        let message = message.ok_or(Error::InvalidArgument(Error::NULL_MESSAGE))?;
        self.tag_source(message);
        message.add_element(TARGET_PEER_ID_TAG, peer_id.clone());
        debug!(target_peer = %peer_id, elements = message.len(), "sending message");
        self.transport.do_send(peer_id, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hooks that accept everything and rely on the default lifecycle.
    struct NullHooks;

    #[async_trait]
    impl TransportHooks for NullHooks {
        async fn do_broadcast(&self, _message: &mut Message) -> Result<bool> {
            Ok(true)
        }

        async fn do_send(&self, _peer_id: &PeerId, _message: &mut Message) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_default_lifecycle_is_noop() {
        let dispatcher = Dispatcher::new(NullHooks);
        dispatcher.stop().await.unwrap();
        dispatcher.start().await.unwrap();
        dispatcher.start().await.unwrap();
        dispatcher.stop().await.unwrap();
        assert!(dispatcher.local_peer_id().is_none());
    }

    #[test]
    fn test_local_peer_id_assignment() {
        let peer = PeerId::new("g", "a", 1);
        let mut dispatcher = Dispatcher::new(NullHooks);
        assert!(dispatcher.local_peer_id().is_none());

        dispatcher.set_local_peer_id(Some(peer.clone()));
        assert_eq!(dispatcher.local_peer_id(), Some(&peer));

        let dispatcher = Dispatcher::new(NullHooks).with_local_peer_id(peer.clone());
        assert_eq!(dispatcher.local_peer_id(), Some(&peer));
    }

    #[test]
    fn test_from_config() {
        let peer = PeerId::new("g", "a", 1);
        let config = DispatchConfig {
            local_peer_id: Some(peer.clone()),
        };
        let dispatcher = Dispatcher::from_config(&config, NullHooks);
        assert_eq!(dispatcher.local_peer_id(), Some(&peer));
    }

    #[test]
    fn test_lifecycle_state_default() {
        assert_eq!(LifecycleState::default(), LifecycleState::Stopped);
    }
}
