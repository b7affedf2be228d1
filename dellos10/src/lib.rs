//! # dellos10
//!
//! Vendor-neutral driver core for Dell EMC Networking OS10 switches.
//!
//! dellos10 turns what an OS10 switch prints into typed, cross-vendor
//! records, and stages configuration changes on a device that has no
//! multi-step commit of its own.
//!
//! ## Features
//!
//! - Column table, key/value block and JSON output parsing
//! - Facts, interfaces, routes, BGP, LLDP, environment and SNMP getters
//! - Candidate configuration with merge-semantics diffing
//! - Every dropped device record reported as a [`Diagnostic`]
//! - Bring-your-own transport through the [`DeviceSession`] trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dellos10::{ConfigSession, DriverBuilder, NetworkDriver};
//!
//! # async fn example(session: impl dellos10::DeviceSession) -> Result<(), dellos10::Error> {
//! let mut driver = DriverBuilder::new(session).build()?;
//!
//! let interfaces = driver.get_interfaces().await?;
//! for (name, iface) in interfaces.iter() {
//!     println!("{}: up={} speed={}", name, iface.is_up, iface.speed);
//! }
//! for dropped in &interfaces.diagnostics {
//!     println!("skipped: {}", dropped);
//! }
//!
//! driver.load_merge_candidate("interface ethernet1/1/1\n description uplink\n").await?;
//! println!("{}", driver.compare_config().await?);
//! driver.commit_config().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod platform;
pub mod session;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use config::{CandidateState, ConfigDiff};
pub use driver::{
    ConfigSession, DriverBuilder, DriverConfig, ImageManager, NetworkDriver, Os10Driver,
};
pub use error::{Error, Result};
pub use platform::{CommandCategory, PlatformDefinition};
pub use session::{ApplyAck, DeviceSession};
pub use snapshot::{Diagnostic, DropReason, Snapshot};
