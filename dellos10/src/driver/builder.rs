//! Builder for creating OS10 drivers.

use serde::{Deserialize, Serialize};

use super::os10::Os10Driver;
use crate::error::{DriverError, Result};
use crate::platform::{PlatformDefinition, PlatformRegistry};
use crate::session::DeviceSession;

/// Driver settings that can be loaded from a file.
///
/// ```rust
/// use dellos10::driver::DriverConfig;
///
/// let config: DriverConfig = serde_json::from_str(r#"{"save_on_commit": false}"#).unwrap();
/// assert_eq!(config.platform, "dellos10");
/// assert!(!config.save_on_commit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Registered platform name.
    pub platform: String,

    /// Persist the running configuration after every commit.
    pub save_on_commit: bool,

    /// Failure patterns added on top of the platform's own.
    pub extra_failure_patterns: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            platform: "dellos10".to_string(),
            save_on_commit: true,
            extra_failure_patterns: Vec::new(),
        }
    }
}

/// Builder for constructing an [`Os10Driver`].
///
/// # Example
///
/// ```rust,ignore
/// use dellos10::driver::DriverBuilder;
///
/// let driver = DriverBuilder::new(session)
///     .save_on_commit(false)
///     .build()?;
/// ```
pub struct DriverBuilder<S> {
    session: S,
    config: DriverConfig,
    custom_platform: Option<PlatformDefinition>,
}

impl<S: DeviceSession> DriverBuilder<S> {
    /// Create a new builder around an established session.
    pub fn new(session: S) -> Self {
        Self {
            session,
            config: DriverConfig::default(),
            custom_platform: None,
        }
    }

    /// Replace all settings at once.
    pub fn config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the platform name (default: "dellos10").
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.platform = platform.into();
        self
    }

    /// Set a custom platform definition.
    pub fn custom_platform(mut self, platform: PlatformDefinition) -> Self {
        self.custom_platform = Some(platform);
        self
    }

    /// Whether to save the configuration after commit (default: true).
    pub fn save_on_commit(mut self, save: bool) -> Self {
        self.config.save_on_commit = save;
        self
    }

    /// Treat output containing `pattern` as a failed command.
    pub fn failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.extra_failure_patterns.push(pattern.into());
        self
    }

    /// Build the driver.
    pub fn build(self) -> Result<Os10Driver<S>> {
        let mut platform = match self.custom_platform {
            Some(custom) => custom,
            None => {
                if self.config.platform.trim().is_empty() {
                    return Err(DriverError::InvalidConfig {
                        message: "Platform must be specified".to_string(),
                    }
                    .into());
                }
                PlatformRegistry::lookup(&self.config.platform)?
            }
        };

        for pattern in self.config.extra_failure_patterns {
            if pattern.is_empty() {
                return Err(DriverError::InvalidConfig {
                    message: "failure patterns must not be empty".to_string(),
                }
                .into());
            }
            platform.failed_when_contains.push(pattern);
        }

        if self.config.save_on_commit && platform.save_command.trim().is_empty() {
            return Err(DriverError::InvalidConfig {
                message: format!(
                    "platform '{}' has no save command but save_on_commit is enabled",
                    platform.name
                ),
            }
            .into());
        }

        Ok(Os10Driver::new(
            self.session,
            platform,
            self.config.save_on_commit,
        ))
    }
}
