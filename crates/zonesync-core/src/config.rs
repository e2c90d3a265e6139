//! Configuration types for zonesync
//!
//! This module defines all configuration structures used throughout the workspace.

use serde::{Deserialize, Serialize};

/// Default minimum TTL enforced by Cloudflare
pub const DEFAULT_CLOUDFLARE_MIN_TTL: u32 = 120;

/// Default TTL for generated ACME challenge CNAMEs
pub const DEFAULT_ACME_TTL: u32 = 3600;

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Target provider
    pub provider: ProviderConfig,

    /// Zones to synchronize
    pub zones: Vec<ZoneConfig>,

    /// Accept records that fail validation (with a warning)
    #[serde(default)]
    pub lenient: bool,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zones.is_empty() {
            return Err(crate::Error::config("No zones configured"));
        }

        self.provider.validate()?;
        for zone in &self.zones {
            zone.validate()?;
        }

        Ok(())
    }
}

/// A zone and the sources that describe its desired state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone name; a trailing dot is added by [`ZoneConfig::new`]
    pub name: String,

    /// Sources applied in order to build the desired zone
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl ZoneConfig {
    /// Create a zone configuration with no sources
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('.') {
            name.push('.');
        }
        Self {
            name,
            sources: Vec::new(),
        }
    }

    /// Append a source
    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.sources.push(source);
        self
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.trim_end_matches('.').is_empty() {
            return Err(crate::Error::config("Zone name cannot be empty"));
        }
        if self.sources.is_empty() {
            return Err(crate::Error::config(format!(
                "Zone {} has no sources",
                self.name
            )));
        }
        for source in &self.sources {
            source.validate()?;
        }
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Account email; when set, `token` is a global API key
        #[serde(default)]
        email: Option<String>,
        /// API token (or global API key when `email` is set)
        token: String,
        /// Provider-enforced minimum TTL
        #[serde(default = "default_min_ttl")]
        min_ttl: u32,
        /// Log mutating calls instead of sending them
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                email,
                min_ttl,
                dry_run,
                ..
            } => f
                .debug_struct("Cloudflare")
                .field("email", email)
                .field("token", &"<REDACTED>")
                .field("min_ttl", min_ttl)
                .field("dry_run", dry_run)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<REDACTED>")
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { email, token, .. } => {
                if token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if email.as_deref().is_some_and(|e| !e.contains('@')) {
                    return Err(crate::Error::config(
                        "Cloudflare account email must be an email address",
                    ));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// JSON zone files, one `<zone>.json` per zone
    File {
        /// Directory holding the zone files
        directory: String,
    },

    /// `_acme-challenge` CNAMEs delegating validation to another zone
    AcmeChallengeCnames {
        /// Zone the challenge CNAMEs point into
        target_zone: String,
        /// TTL of the generated records
        #[serde(default = "default_acme_ttl")]
        ttl: u32,
    },

    /// Custom source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SourceConfig {
    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SourceConfig::File { directory } => {
                if directory.is_empty() {
                    return Err(crate::Error::config("Zone file directory cannot be empty"));
                }
                Ok(())
            }
            SourceConfig::AcmeChallengeCnames { target_zone, .. } => {
                if target_zone.trim_end_matches('.').is_empty() {
                    return Err(crate::Error::config(
                        "ACME challenge target zone cannot be empty",
                    ));
                }
                Ok(())
            }
            SourceConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom source factory cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the source type name
    pub fn type_name(&self) -> &str {
        match self {
            SourceConfig::File { .. } => "file",
            SourceConfig::AcmeChallengeCnames { .. } => "acme_challenge_cnames",
            SourceConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_min_ttl() -> u32 {
    DEFAULT_CLOUDFLARE_MIN_TTL
}

fn default_acme_ttl() -> u32 {
    DEFAULT_ACME_TTL
}
