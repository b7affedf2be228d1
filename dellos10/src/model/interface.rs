use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Operational and configured state of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Canonical OS10 name, e.g. `ethernet1/1/1`.
    pub name: String,
    pub description: String,
    /// Administrative state.
    pub is_enabled: bool,
    /// Operational state. Never `true` while `is_enabled` is `false`.
    pub is_up: bool,
    /// Bits per second, 0 when unknown.
    pub speed: u64,
    pub mtu: u32,
    pub mac_address: Option<String>,
    pub last_flapped: Option<DateTime<Utc>>,
}

/// Addresses configured on one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceIp {
    /// Address to prefix length.
    pub ipv4: IndexMap<Ipv4Addr, u8>,
    pub ipv6: IndexMap<Ipv6Addr, u8>,
}

impl InterfaceIp {
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }
}

/// Traffic counters for one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub rx_octets: u64,
    pub tx_octets: u64,
    pub rx_unicast_packets: u64,
    pub tx_unicast_packets: u64,
    pub rx_multicast_packets: u64,
    pub tx_multicast_packets: u64,
    pub rx_broadcast_packets: u64,
    pub tx_broadcast_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_discards: u64,
    pub tx_discards: u64,
}

/// One entry of the MAC address table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacEntry {
    pub mac: String,
    pub interface: String,
    pub vlan: u16,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub active: bool,
}
