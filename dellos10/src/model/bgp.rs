use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// BGP finite state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BgpState {
    Idle,
    Connect,
    Active,
    OpenSent,
    OpenConfirm,
    Established,
    Unknown,
}

impl BgpState {
    /// Map the device spelling (`established`, `open-sent`, `OpenConfirm`, ...).
    pub fn from_device(value: &str) -> Self {
        let folded: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "idle" => Self::Idle,
            "connect" => Self::Connect,
            "active" => Self::Active,
            "opensent" => Self::OpenSent,
            "openconfirm" => Self::OpenConfirm,
            "established" => Self::Established,
            _ => Self::Unknown,
        }
    }

    pub fn is_up(self) -> bool {
        self == Self::Established
    }
}

impl fmt::Display for BgpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Prefix counters for one address family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFamilyCounts {
    pub received_prefixes: u64,
    pub accepted_prefixes: u64,
    pub sent_prefixes: u64,
}

/// Summary view of one BGP peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighbor {
    pub remote_address: String,
    pub local_as: u32,
    pub remote_as: u32,
    pub remote_id: String,
    pub description: String,
    pub is_enabled: bool,
    pub is_up: bool,
    pub state: BgpState,
    /// Seconds in the current state.
    pub uptime: u64,
    /// Keyed by address family (`ipv4`, `ipv6`).
    pub address_family: IndexMap<String, AddressFamilyCounts>,
}

/// Peers of one VRF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpVrf {
    pub router_id: String,
    /// Keyed by peer address.
    pub peers: IndexMap<String, BgpNeighbor>,
}

/// Detailed view of one BGP peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighborDetail {
    pub up: bool,
    pub local_as: u32,
    pub remote_as: u32,
    pub router_id: String,
    pub local_address: String,
    pub local_port: u16,
    pub remote_address: String,
    pub remote_port: u16,
    pub routing_table: String,
    pub connection_state: BgpState,
    pub input_messages: u64,
    pub output_messages: u64,
    pub input_updates: u64,
    pub output_updates: u64,
    pub holdtime: u32,
    pub configured_holdtime: u32,
    pub keepalive: u32,
    pub configured_keepalive: u32,
    pub active_prefix_count: u64,
    pub received_prefix_count: u64,
    pub accepted_prefix_count: u64,
    pub advertised_prefix_count: u64,
}

/// Configured attributes of a neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpPeerConfig {
    pub description: String,
    pub local_as: u32,
    pub remote_as: u32,
    pub local_address: String,
    pub route_reflector_client: bool,
    pub is_shutdown: bool,
}

/// A template (peer group) with the neighbors inheriting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpPeerGroup {
    pub description: String,
    pub local_as: u32,
    pub remote_as: u32,
    pub multihop_ttl: u8,
    pub remove_private_as: bool,
    pub neighbors: IndexMap<String, BgpPeerConfig>,
}

/// BGP configuration grouped by template; ungrouped neighbors live under `_`.
pub type BgpConfig = IndexMap<String, BgpPeerGroup>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(BgpState::from_device("established"), BgpState::Established);
        assert_eq!(BgpState::from_device("Open-Sent"), BgpState::OpenSent);
        assert_eq!(BgpState::from_device("OPENCONFIRM"), BgpState::OpenConfirm);
        assert_eq!(BgpState::from_device("clearing"), BgpState::Unknown);
        assert!(BgpState::Established.is_up());
        assert!(!BgpState::Active.is_up());
    }
}
