use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocol that installed a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteProtocol {
    Connected,
    Static,
    Bgp,
    Ospf,
    Isis,
    Local,
    Unknown,
}

impl RouteProtocol {
    /// Map a device or caller spelling; anything unrecognized is `Unknown`.
    pub fn from_device(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "connected" | "direct" | "c" => Self::Connected,
            "static" | "s" => Self::Static,
            "bgp" | "b" | "ebgp" | "ibgp" => Self::Bgp,
            "ospf" | "o" | "ospfv3" => Self::Ospf,
            "isis" | "is-is" | "i" => Self::Isis,
            "local" | "l" => Self::Local,
            _ => Self::Unknown,
        }
    }

    /// Filter keyword accepted by `show ip route`, if the device has one.
    pub fn cli_filter(self) -> Option<&'static str> {
        match self {
            Self::Connected => Some("connected"),
            Self::Static => Some("static"),
            Self::Bgp => Some("bgp"),
            Self::Ospf => Some("ospf"),
            _ => None,
        }
    }
}

impl fmt::Display for RouteProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "connected",
            Self::Static => "static",
            Self::Bgp => "bgp",
            Self::Ospf => "ospf",
            Self::Isis => "isis",
            Self::Local => "local",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One next hop toward a destination prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination in `address/length` form.
    pub destination: String,
    pub next_hop: Option<String>,
    pub protocol: RouteProtocol,
    pub current_active: bool,
    /// Administrative distance.
    pub preference: u32,
    pub metric: u32,
    pub outgoing_interface: Option<String>,
    /// Seconds since the route was installed, when reported.
    pub age: Option<u64>,
    /// VRF name.
    pub routing_table: String,
}
