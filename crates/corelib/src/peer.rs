//! Peer identity.
//!
//! A `PeerId` names one addressable member of a cluster group. It is
//! immutable, cheap to compare and hash, and carries enough context (group
//! and instance names) for transports to route by group.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one peer in a group.
///
/// Two identifiers are equal iff group name, instance name and unique id all
/// match. Ordering is lexicographic over (group, instance, unique id).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PeerId {
    group_name: String,
    instance_name: String,
    unique_id: u128,
}

impl PeerId {
    /// Construct a peer identifier.
    pub fn new(group_name: impl Into<String>, instance_name: impl Into<String>, unique_id: u128) -> Self {
        Self {
            group_name: group_name.into(),
            instance_name: instance_name.into(),
            unique_id,
        }
    }

    /// Name of the group this peer belongs to.
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Human-readable instance name.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn unique_id(&self) -> u128 {
        self.unique_id
    }

    /// True if both peers belong to the same group.
    pub fn same_group(&self, other: &PeerId) -> bool {
        self.group_name == other.group_name
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{:032x}", self.instance_name, self.group_name, self.unique_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_equality() {
        let a = PeerId::new("cluster", "a", 1);
        assert_eq!(a, PeerId::new("cluster", "a", 1));
        assert_ne!(a, PeerId::new("cluster", "a", 2));
        assert_ne!(a, PeerId::new("other", "a", 1));
    }

    #[test]
    fn test_peer_display() {
        let p = PeerId::new("cluster", "member-1", 0xff);
        assert_eq!(p.to_string(), format!("member-1@cluster#{:032x}", 0xffu128));
    }

    #[test]
    fn test_same_group() {
        let a = PeerId::new("cluster", "a", 1);
        let b = PeerId::new("cluster", "b", 2);
        let c = PeerId::new("elsewhere", "c", 3);
        assert!(a.same_group(&b));
        assert!(!a.same_group(&c));
    }
}
