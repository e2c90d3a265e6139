// # Cloudflare DNS Provider
//
// Pushes canonical zone snapshots to Cloudflare through a REST API that has
// no transactions and stores each record value as its own wire record.
//
// ## Layout
//
// - `wire`: the API's record, fragment and page shapes
// - `codec`: canonical records <-> wire fragments
// - `fingerprint`: structural content identity of a wire record
// - `client`: the `CloudflareApi` transport seam and its reqwest client
// - `directory`: paginated, cached zone and record listings
// - `filter`: changes the provider refuses or that only churn
// - `reconcile`: one change -> ordered create/update/delete calls
// - `provisioner`: applies a whole plan to one zone
//
// ## Failure Model
//
// Nothing here retries. A failed call stops the plan and is returned to the
// caller; re-running the sync against the now-current live state is the
// recovery path.
//
// ## Security
//
// - Credentials never appear in logs or `Debug` output
// - Credentials are provided through configuration only

pub mod client;
pub mod codec;
pub mod directory;
pub mod filter;
pub mod fingerprint;
pub mod provisioner;
pub mod reconcile;
pub mod wire;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use zonesync_core::config::ProviderConfig;
use zonesync_core::{
    Change, Error, Plan, Provider, ProviderFactory, Record, RecordType, Registry, Result, Source,
    Zone,
};

pub use client::{CloudflareApi, Credentials, HttpClient};
pub use directory::ZoneDirectory;
pub use reconcile::WireCall;
pub use wire::{WireFragment, WireRecord, WireType};

use crate::codec::decode;

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// Built with `dry_run`, the provider lists zones and records as usual but
/// only logs the create, update and delete calls it would send.
pub struct CloudflareProvider {
    directory: ZoneDirectory,
    min_ttl: u32,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("min_ttl", &self.min_ttl)
            .finish_non_exhaustive()
    }
}

impl CloudflareProvider {
    /// Create a provider talking to the public Cloudflare API
    pub fn new(credentials: Credentials, min_ttl: u32, dry_run: bool) -> Result<Self> {
        let client = HttpClient::new(credentials, dry_run)?;
        Ok(Self::with_api(Arc::new(client), min_ttl))
    }

    /// Create a provider on top of any transport
    pub fn with_api(api: Arc<dyn CloudflareApi>, min_ttl: u32) -> Self {
        Self {
            directory: ZoneDirectory::new(api),
            min_ttl,
        }
    }

    /// Provider-enforced minimum TTL
    pub fn min_ttl(&self) -> u32 {
        self.min_ttl
    }

    /// The cached zone and record listings
    pub fn directory(&self) -> &ZoneDirectory {
        &self.directory
    }
}

#[async_trait]
impl Source for CloudflareProvider {
    fn id(&self) -> &str {
        "cloudflare"
    }

    fn supports(&self, record_type: RecordType) -> bool {
        RecordType::ALL.contains(&record_type)
    }

    async fn populate(&self, zone: &mut Zone, target: bool, lenient: bool) -> Result<bool> {
        debug!(
            "populate: name={}, target={}, lenient={}",
            zone.name(),
            target,
            lenient
        );
        let before = zone.len();

        let exists = self.directory.zone_id(zone.name()).await?.is_some();
        if !exists {
            info!("populate:   found 0 records, exists=false");
            return Ok(false);
        }

        let mut grouped: BTreeMap<(String, WireType), Vec<WireRecord>> = BTreeMap::new();
        for record in self.directory.records(zone.name()).await? {
            let Some(wire_type) = record.wire_type() else {
                debug!(
                    "populate: skipping unsupported {} record {}",
                    record.record_type, record.name
                );
                continue;
            };
            let name = zone.hostname_from_fqdn(&record.name);
            grouped.entry((name, wire_type)).or_default().push(record);
        }

        for ((name, wire_type), records) in grouped {
            let record_type = wire_type.canonical(&name);
            let (ttl, data) = decode(record_type, &records)?;
            let record = Record::new(zone.name(), name, ttl, data);
            zone.add_record(record, false, lenient)?;
        }

        info!(
            "populate:   found {} records, exists=true",
            zone.len() - before
        );
        Ok(true)
    }
}

#[async_trait]
impl Provider for CloudflareProvider {
    fn include_change(&self, change: &Change) -> bool {
        filter::include_change(change, self.min_ttl)
    }

    async fn apply(&self, plan: &Plan) -> Result<usize> {
        provisioner::apply(&self.directory, plan, self.min_ttl).await
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl ProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
        match config {
            ProviderConfig::Cloudflare {
                email,
                token,
                min_ttl,
                dry_run,
            } => {
                let credentials = Credentials::new(email.clone(), token.clone())?;
                Ok(Box::new(CloudflareProvider::new(
                    credentials,
                    *min_ttl,
                    *dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::Registry;
///
/// let registry = Registry::new();
/// zonesync_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &Registry) {
    registry.register_provider("cloudflare", Box::new(CloudflareFactory));
}
