//! Message container.
//!
//! A `Message` is an ordered collection of keyed elements. The dispatcher only
//! ever adds elements; transports and receivers read them back by key.
//!
//! # Well-known keys
//!
//! [`SOURCE_PEER_ID_TAG`] and [`TARGET_PEER_ID_TAG`] are shared by every
//! transport so a receiver can extract sender and destination identity no
//! matter which transport delivered the message.

use crate::peer::PeerId;
use bytes::Bytes;

/// Element key carrying the sending peer's identifier.
pub const SOURCE_PEER_ID_TAG: &str = "sourcePeerId";

/// Element key carrying the destination peer's identifier.
pub const TARGET_PEER_ID_TAG: &str = "targetPeerId";

/// Value stored under a message element key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementValue {
    Peer(PeerId),
    Text(String),
    Bytes(Bytes),
    Integer(i64),
}

impl ElementValue {
    /// Returns the peer identifier if this value holds one.
    pub fn as_peer(&self) -> Option<&PeerId> {
        match self {
            ElementValue::Peer(peer) => Some(peer),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ElementValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ElementValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ElementValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<PeerId> for ElementValue {
    fn from(peer: PeerId) -> Self {
        ElementValue::Peer(peer)
    }
}

impl From<String> for ElementValue {
    fn from(text: String) -> Self {
        ElementValue::Text(text)
    }
}

impl From<&str> for ElementValue {
    fn from(text: &str) -> Self {
        ElementValue::Text(text.to_owned())
    }
}

impl From<Bytes> for ElementValue {
    fn from(bytes: Bytes) -> Self {
        ElementValue::Bytes(bytes)
    }
}

impl From<i64> for ElementValue {
    fn from(n: i64) -> Self {
        ElementValue::Integer(n)
    }
}

/// Mutable, ordered container of keyed elements.
///
/// Keys are unique: adding an element under an existing key drops the old
/// element and appends the new one, so iteration order always reflects the
/// order of the most recent additions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    elements: Vec<(String, ElementValue)>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Message::add_element`].
    pub fn with_element(mut self, key: impl Into<String>, value: impl Into<ElementValue>) -> Self {
        self.add_element(key, value);
        self
    }

    /// Add an element, replacing any element already stored under `key`.
    pub fn add_element(&mut self, key: impl Into<String>, value: impl Into<ElementValue>) {
        let key = key.into();
        self.elements.retain(|(existing, _)| *existing != key);
        self.elements.push((key, value.into()));
    }

    /// Look up the element stored under `key`.
    pub fn element(&self, key: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Remove and return the element stored under `key`.
    pub fn remove_element(&mut self, key: &str) -> Option<ElementValue> {
        let idx = self.elements.iter().position(|(existing, _)| existing == key)?;
        Some(self.elements.remove(idx).1)
    }

    /// Iterate over elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &ElementValue)> {
        self.elements.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Sender identity attached under [`SOURCE_PEER_ID_TAG`], if any.
    pub fn source_peer_id(&self) -> Option<&PeerId> {
        self.element(SOURCE_PEER_ID_TAG).and_then(ElementValue::as_peer)
    }

    /// Destination identity attached under [`TARGET_PEER_ID_TAG`], if any.
    pub fn target_peer_id(&self) -> Option<&PeerId> {
        self.element(TARGET_PEER_ID_TAG).and_then(ElementValue::as_peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message() {
        let msg = Message::new();
        assert!(msg.is_empty());
        assert_eq!(msg.len(), 0);
        assert!(msg.source_peer_id().is_none());
        assert!(msg.target_peer_id().is_none());
    }

    #[test]
    fn test_insertion_order() {
        let msg = Message::new()
            .with_element("a", 1i64)
            .with_element("b", "two")
            .with_element("c", Bytes::from_static(b"three"));
        let keys: Vec<_> = msg.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(msg.element("a").and_then(ElementValue::as_integer), Some(1));
        assert_eq!(msg.element("b").and_then(ElementValue::as_text), Some("two"));
        assert_eq!(
            msg.element("c").and_then(ElementValue::as_bytes),
            Some(&Bytes::from_static(b"three"))
        );
    }

    #[test]
    fn test_replace_keeps_single_element() {
        let mut msg = Message::new().with_element("a", 1i64).with_element("b", 2i64);
        msg.add_element("a", 3i64);

        assert_eq!(msg.len(), 2);
        let keys: Vec<_> = msg.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(msg.element("a").and_then(ElementValue::as_integer), Some(3));
    }

    #[test]
    fn test_remove_element() {
        let mut msg = Message::new().with_element("a", 1i64);
        assert_eq!(msg.remove_element("a"), Some(ElementValue::Integer(1)));
        assert_eq!(msg.remove_element("a"), None);
        assert!(msg.is_empty());
    }

    #[test]
    fn test_peer_accessors() {
        let source = PeerId::new("g", "src", 1);
        let target = PeerId::new("g", "dst", 2);
        let msg = Message::new()
            .with_element(SOURCE_PEER_ID_TAG, source.clone())
            .with_element(TARGET_PEER_ID_TAG, target.clone());
        assert_eq!(msg.source_peer_id(), Some(&source));
        assert_eq!(msg.target_peer_id(), Some(&target));
    }

    #[test]
    fn test_peer_accessor_ignores_wrong_type() {
        let msg = Message::new().with_element(SOURCE_PEER_ID_TAG, "not a peer");
        assert!(msg.source_peer_id().is_none());
    }
}
