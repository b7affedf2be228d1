//! Canonical, vendor-neutral entities.
//!
//! Every value here is an immutable snapshot built fresh on each query.
//! Units are fixed: speeds in bits per second, durations in seconds, MAC
//! addresses as lower-case colon-separated hex, timestamps in UTC.

mod bgp;
mod environment;
mod facts;
mod interface;
mod lldp;
mod route;
mod system;

pub use bgp::{
    AddressFamilyCounts, BgpConfig, BgpNeighbor, BgpNeighborDetail, BgpPeerConfig, BgpPeerGroup,
    BgpState, BgpVrf,
};
pub use environment::{CpuUsage, Environment, FanStatus, MemoryUsage, PowerSupply, Temperature};
pub use facts::Facts;
pub use interface::{Interface, InterfaceCounters, InterfaceIp, MacEntry};
pub use lldp::{LldpCapability, LldpNeighbor, LldpNeighborDetail};
pub use route::{Route, RouteProtocol};
pub use system::{
    ConfigRetrieve, DeviceConfig, ImageOperation, ImageStatus, ImageTaskStatus, PingOptions,
    PingOutcome, PingProbe, PingStats, SnmpCommunity, SnmpInformation,
};
