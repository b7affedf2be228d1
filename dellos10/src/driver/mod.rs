//! Uniform driver API.
//!
//! Three traits split the surface by how they touch the device:
//!
//! - [`NetworkDriver`]: read-only getters. They take `&self`, so several
//!   may run at once against the same session.
//! - [`ConfigSession`]: the candidate lifecycle. Every method takes
//!   `&mut self`, which serializes configuration changes.
//! - [`ImageManager`]: software image install and upgrade.
//!
//! [`Os10Driver`] implements all three on top of any
//! [`DeviceSession`](crate::session::DeviceSession).

mod builder;
mod interactive;
mod os10;

pub use builder::{DriverBuilder, DriverConfig};
pub use interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
pub use os10::Os10Driver;

use std::future::Future;

use indexmap::IndexMap;

use crate::config::{CandidateState, ConfigDiff};
use crate::error::Result;
use crate::model::{
    BgpConfig, BgpNeighborDetail, BgpVrf, ConfigRetrieve, DeviceConfig, Environment, Facts,
    ImageOperation, ImageStatus, Interface, InterfaceCounters, InterfaceIp, LldpNeighbor,
    LldpNeighborDetail, MacEntry, PingOptions, PingOutcome, Route, RouteProtocol,
    SnmpInformation,
};
use crate::snapshot::Snapshot;

/// Neighbor details per VRF, grouped by remote AS.
pub type BgpNeighborDetails = IndexMap<String, IndexMap<u32, Vec<BgpNeighborDetail>>>;

/// Read-only device state.
///
/// Every getter builds a fresh [`Snapshot`] from the device; nothing is
/// cached between calls.
pub trait NetworkDriver: Send + Sync {
    fn get_facts(&self) -> impl Future<Output = Result<Snapshot<Facts>>> + Send;

    fn get_environment(&self) -> impl Future<Output = Result<Snapshot<Environment>>> + Send;

    /// Configuration text for the stores selected by `retrieve`.
    fn get_config(
        &self,
        retrieve: ConfigRetrieve,
    ) -> impl Future<Output = Result<DeviceConfig>> + Send;

    fn get_interfaces(
        &self,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, Interface>>>> + Send;

    fn get_interfaces_ip(
        &self,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, InterfaceIp>>>> + Send;

    fn get_interfaces_counters(
        &self,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, InterfaceCounters>>>> + Send;

    /// Routes to `destination`, or the whole table, optionally limited to
    /// one protocol.
    fn get_route_to(
        &self,
        destination: Option<&str>,
        protocol: Option<RouteProtocol>,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, Vec<Route>>>>> + Send;

    /// BGP peer groups; empty `group`/`neighbor` mean "all".
    fn get_bgp_config(
        &self,
        group: &str,
        neighbor: &str,
    ) -> impl Future<Output = Result<Snapshot<BgpConfig>>> + Send;

    fn get_bgp_neighbors(
        &self,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, BgpVrf>>>> + Send;

    fn get_bgp_neighbors_detail(
        &self,
        neighbor: Option<&str>,
    ) -> impl Future<Output = Result<Snapshot<BgpNeighborDetails>>> + Send;

    fn get_lldp_neighbors(
        &self,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, Vec<LldpNeighbor>>>>> + Send;

    fn get_lldp_neighbors_detail(
        &self,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, Vec<LldpNeighborDetail>>>>> + Send;

    fn get_lldp_neighbors_interface_detail(
        &self,
        interface: &str,
    ) -> impl Future<Output = Result<Snapshot<IndexMap<String, Vec<LldpNeighborDetail>>>>> + Send;

    fn get_snmp_information(&self)
    -> impl Future<Output = Result<Snapshot<SnmpInformation>>> + Send;

    fn get_mac_address_table(&self) -> impl Future<Output = Result<Snapshot<Vec<MacEntry>>>> + Send;

    /// Ping from the device. A device-side failure is a
    /// [`PingOutcome::Error`], not an `Err`.
    fn ping(
        &self,
        destination: &str,
        options: &PingOptions,
    ) -> impl Future<Output = Result<PingOutcome>> + Send;

    /// Run arbitrary commands; output keyed by command.
    fn cli(
        &self,
        commands: &[&str],
    ) -> impl Future<Output = Result<IndexMap<String, String>>> + Send;
}

/// Staged configuration changes.
///
/// OS10 can only merge. Replace and rollback report
/// [`UnsupportedOperation`](crate::error::ConfigError::UnsupportedOperation).
pub trait ConfigSession: Send {
    /// Stage `config` for merging; returns the new candidate revision.
    fn load_merge_candidate(&mut self, config: &str) -> impl Future<Output = Result<u64>> + Send;

    fn load_replace_candidate(&mut self, config: &str) -> impl Future<Output = Result<()>> + Send;

    /// Diff the staged candidate against a freshly read running configuration.
    fn compare_config(&mut self) -> impl Future<Output = Result<ConfigDiff>> + Send;

    /// Apply the candidate in one request. The candidate is cleared only
    /// once the device acknowledges it.
    fn commit_config(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Drop the candidate without contacting the device.
    fn discard_config(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn candidate_state(&self) -> CandidateState;
}

/// Software image operations.
pub trait ImageManager: Send {
    /// Install an image into the standby partition.
    fn install_switch_image(
        &mut self,
        image_url: &str,
    ) -> impl Future<Output = Result<ImageOperation>> + Send;

    /// Install an image and reboot into it. `save_config` answers the
    /// unsaved-configuration prompt.
    fn upgrade_switch_image(
        &mut self,
        image_url: &str,
        save_config: bool,
    ) -> impl Future<Output = Result<ImageOperation>> + Send;

    fn get_image_status(&self) -> impl Future<Output = Result<Snapshot<ImageStatus>>> + Send;
}
