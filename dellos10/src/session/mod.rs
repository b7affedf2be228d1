//! Device session facade.
//!
//! The driver never opens connections itself. It is handed a value that
//! implements [`DeviceSession`] and uses exactly two capabilities of it:
//! running a command and applying a block of configuration text. SSH, REST,
//! prompt handling and timeouts all live behind this trait.

mod output;

pub use output::RawOutput;

use std::future::Future;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Device acknowledgement of an `apply` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyAck {
    /// Whether the device accepted the whole configuration block.
    pub acknowledged: bool,
    /// The device's own report when only part of the block was applied.
    pub partial_detail: Option<String>,
}

impl ApplyAck {
    /// Positive acknowledgement.
    pub fn accepted() -> Self {
        Self {
            acknowledged: true,
            partial_detail: None,
        }
    }

    /// Negative acknowledgement with the device's report.
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            acknowledged: false,
            partial_detail: Some(detail.into()),
        }
    }
}

/// Execution primitive for one managed device.
///
/// Implementations must be safe to call concurrently through `&self`; if
/// the underlying transport is single-channel they serialize internally.
pub trait DeviceSession: Send + Sync {
    /// Run one CLI command and return its output with echo and prompt removed.
    fn execute(
        &self,
        command: &str,
    ) -> impl Future<Output = std::result::Result<Bytes, TransportError>> + Send;

    /// Merge a block of configuration into the running configuration.
    fn apply(
        &self,
        config: &str,
    ) -> impl Future<Output = std::result::Result<ApplyAck, TransportError>> + Send;
}
