//! Global registry of named platform definitions.
//!
//! [`DriverConfig`](crate::driver::DriverConfig) refers to platforms by name;
//! deployments that tune failure patterns for a firmware train register
//! their own definition under a new name.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::definition::PlatformDefinition;
use super::os10;
use crate::error::{PlatformError, Result};

static REGISTRY: Lazy<RwLock<PlatformRegistry>> = Lazy::new(|| {
    let mut registry = PlatformRegistry::new();
    registry.register_builtin_platforms();
    RwLock::new(registry)
});

/// Registry for platform definitions.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: HashMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            platforms: HashMap::new(),
        }
    }

    /// Get the global registry.
    pub fn global() -> &'static RwLock<PlatformRegistry> {
        &REGISTRY
    }

    fn register_builtin_platforms(&mut self) {
        let os10 = os10::platform();
        self.platforms.insert(os10.name.clone(), os10);
    }

    /// Register a platform definition. Names must be unique.
    pub fn register(&mut self, platform: PlatformDefinition) -> Result<()> {
        if platform.name.trim().is_empty() {
            return Err(PlatformError::InvalidDefinition {
                message: "platform name must not be empty".to_string(),
            }
            .into());
        }
        if self.platforms.contains_key(&platform.name) {
            return Err(PlatformError::InvalidDefinition {
                message: format!("platform '{}' is already registered", platform.name),
            }
            .into());
        }
        self.platforms.insert(platform.name.clone(), platform);
        Ok(())
    }

    /// Get a platform by name.
    pub fn get(&self, name: &str) -> Option<&PlatformDefinition> {
        self.platforms.get(name)
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    /// Clone a platform out of the global registry.
    pub fn lookup(name: &str) -> Result<PlatformDefinition> {
        let registry = Self::global()
            .read()
            .map_err(|_| PlatformError::InvalidDefinition {
                message: "Failed to acquire registry lock".to_string(),
            })?;
        registry.get(name).cloned().ok_or_else(|| {
            PlatformError::UnknownPlatform {
                name: name.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_platform_registered() {
        let platform = PlatformRegistry::lookup("dellos10").unwrap();
        assert_eq!(platform.vendor, "Dell");
    }

    #[test]
    fn test_unknown_platform() {
        let err = PlatformRegistry::lookup("cisco_ios").unwrap_err();
        assert!(err.to_string().contains("cisco_ios"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = PlatformRegistry::new();
        registry.register(os10::platform()).unwrap();
        assert!(registry.register(os10::platform()).is_err());
        assert!(registry.contains("dellos10"));
        assert!(registry.register(PlatformDefinition::new(" ")).is_err());
    }
}
