//! Platform definitions.
//!
//! A [`PlatformDefinition`] carries the data-only knobs (failure patterns,
//! default hostname, save command). The OS10 command table in [`os10`]
//! carries everything tied to the shape of the CLI output.

mod definition;
pub mod os10;
mod registry;

pub use definition::PlatformDefinition;
pub use os10::{CommandCategory, CommandSpec};
pub use registry::PlatformRegistry;
