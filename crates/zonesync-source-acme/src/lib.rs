// # ACME Challenge CNAME Source
//
// Delegates ACME DNS-01 validation of every host in a zone to another zone.
//
// For each A, AAAA and CNAME record whose name has no wildcard, adds
//
//     _acme-challenge[.<name>]  CNAME  _acme-challenge.<record fqdn><target zone>
//
// so an ACME client only needs write access to the target zone. This source
// never touches the network: it must run after the sources that produce the
// records it derives from.

use async_trait::async_trait;
use tracing::debug;
use zonesync_core::config::SourceConfig;
use zonesync_core::{
    Error, Record, RecordData, RecordType, Registry, Result, Source, SourceFactory, Zone,
};

const CHALLENGE_LABEL: &str = "_acme-challenge";

/// Adds `_acme-challenge` CNAMEs for the hosts already in a zone
#[derive(Debug, Clone)]
pub struct AcmeChallengeCnameSource {
    id: String,
    target_zone: String,
    ttl: u32,
}

impl AcmeChallengeCnameSource {
    /// Create a source pointing challenges into `target_zone`
    ///
    /// A missing trailing dot on `target_zone` is added.
    pub fn new(id: impl Into<String>, target_zone: impl Into<String>, ttl: u32) -> Self {
        let id = id.into();
        let mut target_zone = target_zone.into();
        if !target_zone.ends_with('.') {
            target_zone.push('.');
        }
        debug!("new: id={}, target_zone={}, ttl={}", id, target_zone, ttl);

        Self {
            id,
            target_zone,
            ttl,
        }
    }

    /// Zone the challenge CNAMEs point into
    pub fn target_zone(&self) -> &str {
        &self.target_zone
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    fn challenge_for(&self, record: &Record) -> Record {
        let name = if record.name().is_empty() {
            CHALLENGE_LABEL.to_string()
        } else {
            format!("{}.{}", CHALLENGE_LABEL, record.name())
        };
        let target = format!("{}.{}{}", CHALLENGE_LABEL, record.fqdn(), self.target_zone);

        Record::new(record.zone(), name, self.ttl, RecordData::Cname(target))
    }
}

fn is_eligible(record: &Record) -> bool {
    !record.name().contains('*')
        && matches!(
            record.record_type(),
            RecordType::A | RecordType::Aaaa | RecordType::Cname
        )
}

#[async_trait]
impl Source for AcmeChallengeCnameSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, record_type: RecordType) -> bool {
        record_type == RecordType::Cname
    }

    /// Returns whether any challenge CNAME was added
    async fn populate(&self, zone: &mut Zone, target: bool, lenient: bool) -> Result<bool> {
        debug!(
            "populate: name={}, target={}, lenient={}",
            zone.name(),
            target,
            lenient
        );

        let challenges: Vec<Record> = zone
            .records()
            .filter(|r| is_eligible(r))
            .map(|r| self.challenge_for(r))
            .collect();
        let count = challenges.len();

        for challenge in challenges {
            zone.add_record(challenge, true, lenient)?;
        }

        debug!("populate:   {} eligible record(s)", count);
        Ok(count > 0)
    }
}

/// Factory for creating ACME challenge CNAME sources
pub struct AcmeChallengeCnameFactory;

impl SourceFactory for AcmeChallengeCnameFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn Source>> {
        match config {
            SourceConfig::AcmeChallengeCnames { target_zone, ttl } => {
                config.validate()?;
                Ok(Box::new(AcmeChallengeCnameSource::new(
                    "acme",
                    target_zone.clone(),
                    *ttl,
                )))
            }
            _ => Err(Error::config("Invalid config for ACME challenge CNAME source")),
        }
    }
}

/// Register the ACME challenge CNAME source with a registry
pub fn register(registry: &Registry) {
    registry.register_source("acme_challenge_cnames", Box::new(AcmeChallengeCnameFactory));
}
