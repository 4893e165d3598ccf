//! Transport configuration.

use serde::{Deserialize, Serialize};

/// Default number of messages an endpoint's mailbox can hold.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

/// Settings for an in-memory endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Bounded mailbox size. Deliveries to a full mailbox report `false`.
    pub mailbox_capacity: usize,
    /// Deliver broadcasts back to the sending endpoint as well.
    pub loopback: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            loopback: false,
        }
    }
}
