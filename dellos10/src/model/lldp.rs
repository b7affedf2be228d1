use serde::{Deserialize, Serialize};

/// System capabilities advertised over LLDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LldpCapability {
    Other,
    Repeater,
    Bridge,
    Wlan,
    Router,
    Telephone,
    Docsis,
    Station,
}

impl LldpCapability {
    pub fn from_device(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "other" => Some(Self::Other),
            "repeater" => Some(Self::Repeater),
            "bridge" | "mac bridge" => Some(Self::Bridge),
            "wlan" | "wlan access point" => Some(Self::Wlan),
            "router" => Some(Self::Router),
            "telephone" => Some(Self::Telephone),
            "docsis" | "docsis cable device" => Some(Self::Docsis),
            "station" | "station only" => Some(Self::Station),
            _ => None,
        }
    }

    /// Parse a device capability list (`Router, Bridge`), skipping unknown names.
    pub fn parse_list(value: &str) -> Vec<Self> {
        value
            .split([',', ' '])
            .filter(|s| !s.is_empty())
            .filter_map(Self::from_device)
            .collect()
    }
}

/// One neighbor as seen on a local interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpNeighbor {
    pub hostname: String,
    pub port: String,
    /// Colon-hex when the neighbor advertises a MAC, otherwise as printed.
    pub remote_chassis_id: String,
}

/// Everything the neighbor advertised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpNeighborDetail {
    pub parent_interface: String,
    pub remote_port: String,
    pub remote_port_description: String,
    pub remote_chassis_id: String,
    pub remote_system_name: String,
    pub remote_system_description: String,
    pub remote_system_capab: Vec<LldpCapability>,
    pub remote_system_enable_capab: Vec<LldpCapability>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capability_list() {
        assert_eq!(
            LldpCapability::parse_list("Router, Bridge, Repeater"),
            vec![
                LldpCapability::Router,
                LldpCapability::Bridge,
                LldpCapability::Repeater
            ]
        );
        assert!(LldpCapability::parse_list("").is_empty());
        assert_eq!(LldpCapability::parse_list("router, flux"), vec![LldpCapability::Router]);
    }
}
