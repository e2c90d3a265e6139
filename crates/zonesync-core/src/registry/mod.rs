//! Plugin-based provider and source registry
//!
//! The registry allows providers and sources to be registered dynamically
//! at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonesync_core::registry::Registry;
//! use zonesync_core::config::ProviderConfig;
//!
//! let registry = Registry::new();
//! zonesync_provider_cloudflare::register(&registry);
//!
//! let config = ProviderConfig::Cloudflare { ... };
//! let provider = registry.create_provider(&config)?;
//! ```
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust,ignore
//! // In zonesync-provider-cloudflare
//! pub fn register(registry: &Registry) {
//!     registry.register_provider("cloudflare", Box::new(CloudflareFactory));
//! }
//! ```

use crate::config::{ProviderConfig, SourceConfig};
use crate::error::{Error, Result};
use crate::sources::FileSourceFactory;
use crate::traits::{Provider, ProviderFactory, Source, SourceFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of provider and source factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct Registry {
    /// Registered provider factories
    providers: RwLock<HashMap<String, Box<dyn ProviderFactory>>>,

    /// Registered source factories
    sources: RwLock<HashMap<String, Box<dyn SourceFactory>>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in sources registered
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_source("file", Box::new(FileSourceFactory));
        registry
    }

    /// Register a provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "cloudflare")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn ProviderFactory>) {
        let mut providers = self.providers.write().unwrap_or_else(|e| e.into_inner());
        providers.insert(name.into(), factory);
    }

    /// Register a source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Source type name (e.g., "file", "acme_challenge_cnames")
    /// - `factory`: Factory object for creating source instances
    pub fn register_source(&self, name: impl Into<String>, factory: Box<dyn SourceFactory>) {
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        sources.insert(name.into(), factory);
    }

    /// Create a provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Provider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Create a source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Source>)`: Created source instance
    /// - `Err(Error)`: If source type is not registered or creation fails
    pub fn create_source(&self, config: &SourceConfig) -> Result<Box<dyn Source>> {
        let source_type = config.type_name();
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());

        let factory = sources
            .get(source_type)
            .ok_or_else(|| Error::config(format!("Unknown source type: {}", source_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());
        providers.keys().cloned().collect()
    }

    /// List all registered source types
    pub fn list_sources(&self) -> Vec<String> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());
        providers.contains_key(name)
    }

    /// Check if a source type is registered
    pub fn has_source(&self, name: &str) -> bool {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProviderFactory;

    impl ProviderFactory for MockProviderFactory {
        fn create(&self, _config: &ProviderConfig) -> Result<Box<dyn Provider>> {
            Err(Error::not_found("Mock provider not implemented"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = Registry::new();

        // Initially empty
        assert!(!registry.has_provider("mock"));

        registry.register_provider("mock", Box::new(MockProviderFactory));

        assert!(registry.has_provider("mock"));
        assert!(registry.list_providers().contains(&"mock".to_string()));
    }

    #[test]
    fn test_builtins_include_file_source() {
        let registry = Registry::with_builtins();
        assert!(registry.has_source("file"));

        let source = registry
            .create_source(&SourceConfig::File {
                directory: "zones".to_string(),
            })
            .unwrap();
        assert_eq!(source.id(), "file");
    }

    #[test]
    fn test_unknown_types_are_config_errors() {
        let registry = Registry::new();
        let err = registry
            .create_source(&SourceConfig::AcmeChallengeCnames {
                target_zone: "acme.example.net.".to_string(),
                ttl: 60,
            })
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
