//! In-process group transport.
//!
//! # Model
//!
//! A [`MemoryNetwork`] is a shared registry of started endpoints. Each
//! endpoint owns a bounded tokio channel: the [`MemoryTransport`] half
//! registers the sender on `start` and removes it on `stop`, the [`Mailbox`]
//! half receives.
//!
//! # Delivery semantics
//!
//! - Unicast to an unknown or departed peer reports `false`.
//! - Broadcast reaches every started endpoint in the sender's group (the
//!   sender itself only with `loopback`) and reports `true` iff every
//!   delivery succeeded.
//! - A full or closed mailbox drops the message and reports `false`; the
//!   sender never blocks.
//! - One peer id maps to at most one started endpoint. Dropping a started
//!   transport deregisters it.
//! - Using a transport that is not started is an error.

use std::sync::Arc;

use async_trait::async_trait;
use corelib::{Dispatcher, Error, LifecycleState, Message, PeerId, Result, TransportHooks};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::TransportConfig;

/// Registry of started in-memory endpoints, shared by clone.
#[derive(Clone, Debug, Default)]
pub struct MemoryNetwork {
    endpoints: Arc<DashMap<PeerId, mpsc::Sender<Message>>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an endpoint for `peer_id`. It joins the network on `start`.
    pub fn endpoint(&self, peer_id: PeerId, config: &TransportConfig) -> (MemoryTransport, Mailbox) {
        let (inbox, receiver) = mpsc::channel(config.mailbox_capacity.max(1));
        let transport = MemoryTransport {
            peer_id: peer_id.clone(),
            network: self.clone(),
            inbox,
            loopback: config.loopback,
            state: RwLock::new(LifecycleState::Stopped),
        };
        let mailbox = Mailbox { peer_id, receiver };
        (transport, mailbox)
    }

    /// Started members of `group`, sorted.
    pub fn members(&self, group: &str) -> Vec<PeerId> {
        let mut members: Vec<PeerId> = self
            .endpoints
            .iter()
            .filter(|entry| entry.key().group_name() == group)
            .map(|entry| entry.key().clone())
            .collect();
        members.sort();
        members
    }

    pub fn is_registered(&self, peer_id: &PeerId) -> bool {
        self.endpoints.contains_key(peer_id)
    }

    /// Number of started endpoints across all groups.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    fn lookup(&self, peer_id: &PeerId) -> Option<mpsc::Sender<Message>> {
        self.endpoints.get(peer_id).map(|entry| entry.value().clone())
    }

    fn group_targets(&self, sender: &PeerId, loopback: bool) -> Vec<(PeerId, mpsc::Sender<Message>)> {
        self.endpoints
            .iter()
            .filter(|entry| entry.key().same_group(sender))
            .filter(|entry| loopback || entry.key() != sender)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// Sending half of an in-memory endpoint.
#[derive(Debug)]
pub struct MemoryTransport {
    peer_id: PeerId,
    network: MemoryNetwork,
    inbox: mpsc::Sender<Message>,
    loopback: bool,
    state: RwLock<LifecycleState>,
}

impl MemoryTransport {
    /// Identity of this endpoint.
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    /// Wrap this transport in a dispatcher that stamps its own peer id.
    pub fn dispatcher(self) -> Dispatcher<MemoryTransport> {
        let local = self.peer_id.clone();
        Dispatcher::new(self).with_local_peer_id(local)
    }

    fn ensure_started(&self) -> Result<()> {
        match *self.state.read() {
            LifecycleState::Started => Ok(()),
            LifecycleState::Stopped => Err(Error::NotStarted(self.peer_id.clone())),
        }
    }

    fn deliver(&self, to: &PeerId, tx: &mpsc::Sender<Message>, message: Message) -> bool {
        match tx.try_send(message) {
            Ok(()) => true,
            Err(err) => {
                warn!(from = %self.peer_id, to = %to, error = %err, "message dropped");
                false
            }
        }
    }

    /// Remove this endpoint's registration, leaving any other endpoint
    /// registered under the same id untouched.
    fn deregister(&self) -> bool {
        self.network
            .endpoints
            .remove_if(&self.peer_id, |_, tx| tx.same_channel(&self.inbox))
            .is_some()
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        let started = *self.state.get_mut() == LifecycleState::Started;
        if started && self.deregister() {
            debug!(peer = %self.peer_id, "endpoint dropped while started");
        }
    }
}

#[async_trait]
impl TransportHooks for MemoryTransport {
    async fn do_broadcast(&self, message: &mut Message) -> Result<bool> {
        self.ensure_started()?;
        let targets = self.network.group_targets(&self.peer_id, self.loopback);
        debug!(from = %self.peer_id, targets = targets.len(), "memory broadcast");

        let mut all_delivered = true;
        for (to, tx) in &targets {
            all_delivered &= self.deliver(to, tx, message.clone());
        }
        Ok(all_delivered)
    }

    async fn do_send(&self, peer_id: &PeerId, message: &mut Message) -> Result<bool> {
        self.ensure_started()?;
        match self.network.lookup(peer_id) {
            Some(tx) => {
                debug!(from = %self.peer_id, to = %peer_id, "memory send");
                Ok(self.deliver(peer_id, &tx, message.clone()))
            }
            None => {
                debug!(from = %self.peer_id, to = %peer_id, "unknown peer");
                Ok(false)
            }
        }
    }

    async fn start(&self) -> Result<()> {
        let mut state = self.state.write();
        if *state == LifecycleState::Started {
            return Err(Error::AlreadyStarted(self.peer_id.clone()));
        }
        match self.network.endpoints.entry(self.peer_id.clone()) {
            Entry::Occupied(slot) if !slot.get().same_channel(&self.inbox) => {
                return Err(Error::AlreadyRegistered(self.peer_id.clone()));
            }
            Entry::Occupied(mut slot) => {
                slot.insert(self.inbox.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(self.inbox.clone());
            }
        }
        *state = LifecycleState::Started;
        info!(peer = %self.peer_id, "endpoint joined");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.state.write();
        if *state == LifecycleState::Stopped {
            return Ok(());
        }
        self.deregister();
        *state = LifecycleState::Stopped;
        info!(peer = %self.peer_id, "endpoint left");
        Ok(())
    }
}

/// Receiving half of an in-memory endpoint.
#[derive(Debug)]
pub struct Mailbox {
    peer_id: PeerId,
    receiver: mpsc::Receiver<Message>,
}

impl Mailbox {
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Wait for the next message. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Take the next message if one is queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Take every queued message.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Some(message) = self.try_recv() {
            messages.push(message);
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(name: &str, id: u128) -> PeerId {
        PeerId::new("cluster", name, id)
    }

    #[tokio::test]
    async fn test_start_registers_and_stop_removes() {
        let network = MemoryNetwork::new();
        let (transport, _mailbox) = network.endpoint(peer("a", 1), &TransportConfig::default());

        assert_eq!(transport.state(), LifecycleState::Stopped);
        assert!(network.is_empty());

        transport.start().await.unwrap();
        assert_eq!(transport.state(), LifecycleState::Started);
        assert!(network.is_registered(&peer("a", 1)));

        transport.stop().await.unwrap();
        assert_eq!(transport.state(), LifecycleState::Stopped);
        assert!(!network.is_registered(&peer("a", 1)));
    }

    #[tokio::test]
    async fn test_double_start_rejected_double_stop_tolerated() {
        let network = MemoryNetwork::new();
        let (transport, _mailbox) = network.endpoint(peer("a", 1), &TransportConfig::default());

        transport.stop().await.unwrap();
        transport.start().await.unwrap();
        let err = transport.start().await.unwrap_err();
        assert!(matches!(err, Error::AlreadyStarted(_)));
        transport.stop().await.unwrap();
        transport.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_full_mailbox_reports_false() {
        let network = MemoryNetwork::new();
        let config = TransportConfig {
            mailbox_capacity: 1,
            loopback: false,
        };
        let (a, _a_box) = network.endpoint(peer("a", 1), &config);
        let (b, mut b_box) = network.endpoint(peer("b", 2), &config);
        a.start().await.unwrap();
        b.start().await.unwrap();

        let mut msg = Message::new();
        assert!(a.do_send(&peer("b", 2), &mut msg).await.unwrap());
        assert!(!a.do_send(&peer("b", 2), &mut msg).await.unwrap());
        assert_eq!(b_box.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let network = MemoryNetwork::new();
        let config = TransportConfig {
            mailbox_capacity: 0,
            loopback: true,
        };
        let (a, mut a_box) = network.endpoint(peer("a", 1), &config);
        a.start().await.unwrap();
        assert!(a.do_broadcast(&mut Message::new()).await.unwrap());
        assert!(a_box.try_recv().is_some());
    }
}
