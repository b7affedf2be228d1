//! Platform definition for vendor-specific configuration.

use serde::{Deserialize, Serialize};

/// Platform definition containing the vendor-specific knobs the driver needs.
///
/// Everything here is plain data, so a definition can be loaded from a
/// config file and tweaked per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "dellos10").
    pub name: String,

    /// Vendor reported in facts.
    pub vendor: String,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Hostname the device uses when none is configured.
    pub default_hostname: String,

    /// Command that persists the running configuration.
    pub save_command: String,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor: String::new(),
            failed_when_contains: vec![],
            default_hostname: String::new(),
            save_command: String::new(),
        }
    }

    /// Set the vendor name.
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Set the factory-default hostname.
    pub fn with_default_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.default_hostname = hostname.into();
        self
    }

    /// Set the command used to save the configuration.
    pub fn with_save_command(mut self, command: impl Into<String>) -> Self {
        self.save_command = command.into();
        self
    }

    /// Return the failure pattern found in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_failure_detection() {
        let platform = PlatformDefinition::new("custom")
            .with_vendor("Acme")
            .with_failure_pattern("% Error")
            .with_failure_pattern("% Invalid");

        assert_eq!(platform.detect_failure("% Invalid input"), Some("% Invalid"));
        assert_eq!(platform.detect_failure("all good"), None);
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"{
            "name": "dellos10-lab",
            "vendor": "Dell",
            "failed_when_contains": ["% Error"],
            "default_hostname": "OS10",
            "save_command": "write memory"
        }"#;
        let platform: PlatformDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(platform.name, "dellos10-lab");
        assert_eq!(platform.save_command, "write memory");
    }
}
