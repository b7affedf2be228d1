use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One SNMP community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpCommunity {
    /// `ro`, `rw`, or `N/A` when not configured.
    pub mode: String,
    /// Access list name, or `N/A`.
    pub acl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpInformation {
    pub chassis_id: String,
    pub contact: String,
    pub location: String,
    pub community: IndexMap<String, SnmpCommunity>,
}

/// Parameters for [`ping`](crate::driver::NetworkDriver::ping).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingOptions {
    pub ttl: u8,
    /// Seconds to wait for each reply.
    pub timeout: u32,
    /// Payload bytes.
    pub size: u32,
    pub count: u32,
    /// Source interface or address, sent as `-I`.
    pub source: Option<String>,
    pub vrf: Option<String>,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            ttl: 255,
            timeout: 2,
            size: 100,
            count: 5,
            source: None,
            vrf: None,
        }
    }
}

impl PingOptions {
    /// Render the argument part of the `ping` command line.
    pub fn render(&self, destination: &str) -> String {
        let mut args = String::new();
        if let Some(vrf) = self.vrf.as_deref().filter(|v| !v.is_empty()) {
            args.push_str(" vrf ");
            args.push_str(vrf);
        }
        if let Some(source) = self.source.as_deref().filter(|s| !s.is_empty()) {
            args.push_str(" -I ");
            args.push_str(source);
        }
        args.push_str(&format!(
            " -t {} -W {} -s {} -c {} {}",
            self.ttl, self.timeout, self.size, self.count, destination
        ));
        args
    }
}

/// One reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingProbe {
    pub ip_address: String,
    /// Milliseconds; 0.0 when per-probe times are not reported.
    pub rtt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingStats {
    pub probes_sent: u32,
    pub packet_loss: u32,
    pub rtt_min: f64,
    pub rtt_max: f64,
    pub rtt_avg: f64,
    pub rtt_stddev: f64,
    pub results: Vec<PingProbe>,
}

/// Result of a ping: statistics when any reply came back, else the device text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PingOutcome {
    Success(PingStats),
    Error(String),
}

impl PingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// State of one image task as reported by `show image status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTaskStatus {
    pub task_state: String,
    pub task_status: String,
    /// Percent transferred; only reported for file transfers.
    pub progress_percent: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStatus {
    pub file_transfer_status: ImageTaskStatus,
    pub image_install_status: ImageTaskStatus,
}

/// Whether an image install or upgrade got going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOperation {
    /// Started; follow progress with `get_image_status`.
    Started,
    NotStarted,
}

/// Which configuration stores to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigRetrieve {
    #[default]
    All,
    Running,
    Startup,
    Candidate,
}

impl ConfigRetrieve {
    pub fn includes(self, other: ConfigRetrieve) -> bool {
        self == ConfigRetrieve::All || self == other
    }
}

/// Configuration text; stores that were not requested stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub running: String,
    pub startup: String,
    pub candidate: String,
}
