// # zonesyncd - one-shot zone synchronizer
//
// A thin integration layer: all DNS logic lives in the library crates.
//
// zonesyncd is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and sources
// 4. Building each desired zone from its sources, then planning and
//    applying it against the provider
//
// Zones are synced one after another. The first failing zone stops the run;
// re-running after a failure picks up from the live state.
//
// ## Configuration
//
// ### Zones
// - `ZONESYNC_ZONES`: Comma-separated list of zones to sync
// - `ZONESYNC_ZONE_DIR`: Directory holding `<zone>.json` files
// - `ZONESYNC_LENIENT`: Accept invalid records with a warning (true/false)
//
// ### Cloudflare
// - `ZONESYNC_CLOUDFLARE_TOKEN`: API token, or global API key with an email
// - `ZONESYNC_CLOUDFLARE_EMAIL`: Account email (optional)
// - `ZONESYNC_CLOUDFLARE_MIN_TTL`: Provider minimum TTL (default 120)
// - `ZONESYNC_MODE`: `live` (default) or `dry-run`
//
// ### ACME challenge CNAMEs
// - `ZONESYNC_ACME_TARGET_ZONE`: Zone to delegate challenges to (optional)
// - `ZONESYNC_ACME_TTL`: TTL of the challenge CNAMEs (default 3600)
//
// ### Logging
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export ZONESYNC_ZONES=example.com,example.net
// export ZONESYNC_ZONE_DIR=/etc/zonesync/zones
// export ZONESYNC_CLOUDFLARE_TOKEN=your_token
// export ZONESYNC_MODE=dry-run
//
// zonesyncd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::{DEFAULT_ACME_TTL, DEFAULT_CLOUDFLARE_MIN_TTL};
use zonesync_core::{
    Provider, ProviderConfig, Registry, SourceConfig, SyncConfig, Zone, ZoneConfig,
};

/// Exit codes for different termination scenarios
///
/// - 0: Every zone synced
/// - 1: Configuration or startup error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonesyncExitCode {
    Clean = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    zones: Vec<String>,
    zone_dir: String,
    cloudflare_token: String,
    cloudflare_email: Option<String>,
    cloudflare_min_ttl: u32,
    acme_target_zone: Option<String>,
    acme_ttl: u32,
    dry_run: bool,
    lenient: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let mode = var("ZONESYNC_MODE").unwrap_or_else(|| "live".to_string());
        let dry_run = match mode.to_lowercase().as_str() {
            "live" => false,
            "dry-run" => true,
            other => anyhow::bail!(
                "ZONESYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        let lenient = match non_empty("ZONESYNC_LENIENT") {
            None => false,
            Some(v) => match v.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => anyhow::bail!("ZONESYNC_LENIENT '{}' is not a boolean", v),
            },
        };

        Ok(Self {
            zones: var("ZONESYNC_ZONES")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            zone_dir: var("ZONESYNC_ZONE_DIR").unwrap_or_default(),
            cloudflare_token: var("ZONESYNC_CLOUDFLARE_TOKEN").unwrap_or_default(),
            cloudflare_email: non_empty("ZONESYNC_CLOUDFLARE_EMAIL"),
            cloudflare_min_ttl: parse_u32(
                non_empty("ZONESYNC_CLOUDFLARE_MIN_TTL"),
                "ZONESYNC_CLOUDFLARE_MIN_TTL",
                DEFAULT_CLOUDFLARE_MIN_TTL,
            )?,
            acme_target_zone: non_empty("ZONESYNC_ACME_TARGET_ZONE"),
            acme_ttl: parse_u32(non_empty("ZONESYNC_ACME_TTL"), "ZONESYNC_ACME_TTL", DEFAULT_ACME_TTL)?,
            dry_run,
            lenient,
            log_level: var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.zones.is_empty() {
            anyhow::bail!(
                "ZONESYNC_ZONES must contain at least one zone. \
                Set it via: export ZONESYNC_ZONES=example.com"
            );
        }

        if self.zone_dir.is_empty() {
            anyhow::bail!(
                "ZONESYNC_ZONE_DIR is required. \
                Set it via: export ZONESYNC_ZONE_DIR=/etc/zonesync/zones"
            );
        }

        if !std::path::Path::new(&self.zone_dir).is_dir() {
            anyhow::bail!("ZONESYNC_ZONE_DIR is not a directory: {}", self.zone_dir);
        }

        if self.cloudflare_token.is_empty() {
            anyhow::bail!(
                "ZONESYNC_CLOUDFLARE_TOKEN is required. \
                Set it via: export ZONESYNC_CLOUDFLARE_TOKEN=your_token"
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.sync_config().validate()?;
        Ok(())
    }

    /// The library-level view of this configuration
    fn sync_config(&self) -> SyncConfig {
        let mut sources = vec![SourceConfig::File {
            directory: self.zone_dir.clone(),
        }];
        if let Some(target_zone) = &self.acme_target_zone {
            sources.push(SourceConfig::AcmeChallengeCnames {
                target_zone: target_zone.clone(),
                ttl: self.acme_ttl,
            });
        }

        SyncConfig {
            provider: ProviderConfig::Cloudflare {
                email: self.cloudflare_email.clone(),
                token: self.cloudflare_token.clone(),
                min_ttl: self.cloudflare_min_ttl,
                dry_run: self.dry_run,
            },
            zones: self
                .zones
                .iter()
                .map(|name| {
                    sources
                        .iter()
                        .cloned()
                        .fold(ZoneConfig::new(name.as_str()), ZoneConfig::with_source)
                })
                .collect(),
            lenient: self.lenient,
        }
    }
}

fn parse_u32(value: Option<String>, key: &str, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer. Got: {}", key, v)),
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    info!("Starting zonesyncd");
    info!(
        "Configuration loaded: {} zone(s) [mode: {}]",
        config.zones.len(),
        if config.dry_run { "DRY-RUN" } else { "LIVE" }
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    let sync_config = config.sync_config();
    let code = rt.block_on(async {
        match run(&sync_config).await {
            Ok(applied) => {
                info!("Sync complete: {} change(s) applied", applied);
                ZonesyncExitCode::Clean
            }
            Err(e) => {
                error!("Sync failed: {}", e);
                ZonesyncExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Register every built-in provider and source
fn registry() -> Registry {
    let registry = Registry::with_builtins();

    #[cfg(feature = "cloudflare")]
    {
        info!("Registering Cloudflare provider");
        zonesync_provider_cloudflare::register(&registry);
    }

    #[cfg(feature = "acme")]
    {
        info!("Registering ACME challenge CNAME source");
        zonesync_source_acme::register(&registry);
    }

    registry
}

/// Sync every configured zone, returning the number of changes applied
async fn run(config: &SyncConfig) -> Result<usize> {
    let registry = registry();
    let provider = registry.create_provider(&config.provider)?;

    let mut applied = 0;
    for zone in &config.zones {
        applied += sync_zone(&registry, provider.as_ref(), zone, config.lenient).await?;
    }
    Ok(applied)
}

async fn sync_zone(
    registry: &Registry,
    provider: &dyn Provider,
    zone: &ZoneConfig,
    lenient: bool,
) -> Result<usize> {
    info!("Syncing zone: {}", zone.name);

    let mut desired = Zone::new(zone.name.as_str());
    for source_config in &zone.sources {
        let source = registry.create_source(source_config)?;
        source.populate(&mut desired, false, lenient).await?;
    }
    info!("Desired zone {}: {} record(s)", zone.name, desired.len());

    let Some(plan) = provider.plan(&desired).await? else {
        info!("Zone {} is up to date", zone.name);
        return Ok(0);
    };

    for change in &plan.changes {
        info!(
            "  {} {} {}",
            change.kind(),
            change.record().fqdn(),
            change.record().record_type()
        );
    }

    let applied = provider.apply(&plan).await?;
    info!("Zone {}: {} change(s) applied", zone.name, applied);
    Ok(applied)
}
