//! CLI commands.
//!
//! Each command builds a fresh in-memory group of `members` peers named
//! `member-<i>`, starts them, performs one dispatch, stops them, and reports
//! what every member received. Members are stopped on error paths too.

use std::fmt;

use anyhow::Context;
use clap::Subcommand;
use corelib::{Dispatcher, Lifecycle, Message, MessageSender, MulticastMessageSender, PeerId};
use tracing::info;
use transport::{MemoryNetwork, MemoryTransport, TransportConfig};

/// Element key under which the CLI puts its text payload.
pub const PAYLOAD_KEY: &str = "payload";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Broadcast `text` from member `from` to the whole group.
    Broadcast {
        #[arg(long, default_value_t = 0)]
        from: usize,
        text: String,
    },
    /// Send `text` from member `from` to member `to`.
    Send {
        #[arg(long, default_value_t = 0)]
        from: usize,
        #[arg(long)]
        to: usize,
        text: String,
    },
}

/// One message as seen by a receiving member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Received {
    pub receiver: PeerId,
    pub source: Option<PeerId>,
    pub target: Option<PeerId>,
    pub payload: Option<String>,
}

/// Outcome of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Boolean reported by the dispatch call.
    pub delivered: bool,
    pub received: Vec<Received>,
}

impl Command {
    /// Run on a fresh, private network.
    pub async fn execute(
        &self,
        group: &str,
        members: usize,
        config: &TransportConfig,
    ) -> anyhow::Result<CommandResult> {
        self.execute_on(&MemoryNetwork::new(), group, members, config).await
    }

    /// Run on `network`. Every member started here is stopped again before
    /// returning, on success and on error.
    pub async fn execute_on(
        &self,
        network: &MemoryNetwork,
        group: &str,
        members: usize,
        config: &TransportConfig,
    ) -> anyhow::Result<CommandResult> {
        anyhow::ensure!(members > 0, "a group needs at least one member");

        let mut dispatchers = Vec::with_capacity(members);
        let mut mailboxes = Vec::with_capacity(members);
        for i in 0..members {
            let peer = PeerId::new(group, format!("member-{i}"), i as u128);
            let (transport, mailbox) = network.endpoint(peer, config);
            let dispatcher = transport.dispatcher();
            if let Err(err) = dispatcher.start().await {
                stop_all(&dispatchers).await?;
                return Err(err.into());
            }
            dispatchers.push(dispatcher);
            mailboxes.push(mailbox);
        }
        info!(group, members, "group started");

        let delivered = self.dispatch(&dispatchers).await;
        stop_all(&dispatchers).await?;
        let delivered = delivered?;

        let received = mailboxes
            .iter_mut()
            .flat_map(|mailbox| {
                let receiver = mailbox.peer_id().clone();
                mailbox.drain().into_iter().map(move |message| Received {
                    receiver: receiver.clone(),
                    source: message.source_peer_id().cloned(),
                    target: message.target_peer_id().cloned(),
                    payload: message
                        .element(PAYLOAD_KEY)
                        .and_then(|value| value.as_text())
                        .map(str::to_owned),
                })
            })
            .collect();

        Ok(CommandResult { delivered, received })
    }

    async fn dispatch(&self, dispatchers: &[Dispatcher<MemoryTransport>]) -> anyhow::Result<bool> {
        let delivered = match self {
            Command::Broadcast { from, text } => {
                let sender = member(dispatchers, *from)?;
                let mut message = Message::new().with_element(PAYLOAD_KEY, text.as_str());
                sender.broadcast(Some(&mut message)).await?
            }
            Command::Send { from, to, text } => {
                let sender = member(dispatchers, *from)?;
                let target = member(dispatchers, *to)?.transport().peer_id().clone();
                let mut message = Message::new().with_element(PAYLOAD_KEY, text.as_str());
                sender.send(Some(&target), Some(&mut message)).await?
            }
        };
        Ok(delivered)
    }
}

async fn stop_all(dispatchers: &[Dispatcher<MemoryTransport>]) -> anyhow::Result<()> {
    for dispatcher in dispatchers {
        dispatcher.stop().await?;
    }
    Ok(())
}

fn member(
    dispatchers: &[Dispatcher<MemoryTransport>],
    index: usize,
) -> anyhow::Result<&Dispatcher<MemoryTransport>> {
    dispatchers
        .get(index)
        .with_context(|| format!("no member {index} in a group of {}", dispatchers.len()))
}

fn display_peer(peer: Option<&PeerId>) -> String {
    peer.map_or_else(|| "-".to_owned(), PeerId::to_string)
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "delivered: {}", self.delivered)?;
        for r in &self.received {
            writeln!(
                f,
                "{} <- source={} target={} payload={:?}",
                r.receiver,
                display_peer(r.source.as_ref()),
                display_peer(r.target.as_ref()),
                r.payload.as_deref().unwrap_or(""),
            )?;
        }
        Ok(())
    }
}
