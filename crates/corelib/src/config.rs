//! Dispatch configuration.

use serde::{Deserialize, Serialize};

use crate::peer::PeerId;

/// Settings consumed by [`Dispatcher::from_config`](crate::Dispatcher::from_config).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Identity stamped onto outgoing messages. Left unset, messages go out
    /// without a source element.
    pub local_peer_id: Option<PeerId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_has_no_identity() {
        let config: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn test_config_with_identity() {
        let json = r#"{
            "local_peer_id": {
                "group_name": "cluster",
                "instance_name": "member-0",
                "unique_id": 7
            }
        }"#;
        let config: DispatchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.local_peer_id, Some(PeerId::new("cluster", "member-0", 7)));
    }
}
