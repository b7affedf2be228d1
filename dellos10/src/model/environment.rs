use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanStatus {
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSupply {
    pub status: bool,
    /// Watts; -1.0 when the device does not report it.
    pub capacity: f64,
    pub output: f64,
}

/// Temperature sensor reading in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub temperature: f64,
    pub is_alert: bool,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    /// Percent busy.
    #[serde(rename = "%usage")]
    pub usage: f64,
}

/// Memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub available_ram: u64,
    pub used_ram: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub fans: IndexMap<String, FanStatus>,
    pub power: IndexMap<String, PowerSupply>,
    pub temperature: IndexMap<String, Temperature>,
    pub cpu: IndexMap<String, CpuUsage>,
    pub memory: MemoryUsage,
}
