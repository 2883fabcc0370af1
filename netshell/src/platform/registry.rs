//! Lookup table of platform definitions.

use std::collections::HashMap;

use super::definition::PlatformDefinition;
use super::vendors;
use crate::error::{PlatformError, Result};

/// Registry for platform definitions, keyed by platform name.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: HashMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with every platform shipped in [`vendors`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for platform in vendors::builtin() {
            registry.platforms.insert(platform.name.clone(), platform);
        }
        registry
    }

    /// Register a platform definition after validating it.
    pub fn register(&mut self, platform: PlatformDefinition) -> Result<()> {
        platform.validate()?;
        if self.platforms.contains_key(&platform.name) {
            return Err(PlatformError::AlreadyRegistered {
                name: platform.name.clone(),
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

    /// Get a platform by name or fail with [`PlatformError::UnknownPlatform`].
    pub fn require(&self, name: &str) -> Result<&PlatformDefinition> {
        self.get(name).ok_or_else(|| {
            PlatformError::UnknownPlatform {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    /// Registered platform names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.platforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
