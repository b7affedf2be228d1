use serde::{Deserialize, Serialize};

/// Basic device facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    pub vendor: String,
    pub model: String,
    pub os_version: String,
    pub hostname: String,
    pub fqdn: String,
    /// Seconds since boot.
    pub uptime: u64,
    pub serial_number: String,
    /// Same names, same order, as `get_interfaces`.
    pub interface_list: Vec<String>,
}
