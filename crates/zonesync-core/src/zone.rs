//! In-memory zone snapshot
//!
//! A [`Zone`] holds at most one [`Record`] per (relative name, type) pair.
//! Sources fill zones through [`Zone::add_record`]; providers diff two zones
//! with [`Zone::changes`](crate::plan).

use crate::error::{Error, Result};
use crate::record::{Record, RecordType};
use std::collections::BTreeMap;
use tracing::warn;

/// A DNS zone and the records it contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    name: String,
    records: BTreeMap<(String, RecordType), Record>,
}

impl Zone {
    /// Create an empty zone; a trailing dot is appended to `name` if missing
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into().to_ascii_lowercase();
        if !name.ends_with('.') {
            name.push('.');
        }

        Self {
            name,
            records: BTreeMap::new(),
        }
    }

    /// Fully-qualified zone name with trailing dot
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All records, ordered by (name, type)
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the zone has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record with the given relative name and type
    pub fn get(&self, name: &str, record_type: RecordType) -> Option<&Record> {
        self.records.get(&(name.to_ascii_lowercase(), record_type))
    }

    /// Convert a fully-qualified name (with or without trailing dot) into a
    /// name relative to this zone
    ///
    /// Names outside the zone are returned unchanged.
    pub fn hostname_from_fqdn(&self, fqdn: &str) -> String {
        let fqdn = fqdn.trim_end_matches('.');
        let zone = self.name.trim_end_matches('.');

        if fqdn.eq_ignore_ascii_case(zone) {
            return String::new();
        }

        let split = fqdn.len().checked_sub(zone.len() + 1);
        match split {
            Some(at)
                if fqdn.as_bytes()[at] == b'.'
                    && fqdn[at + 1..].eq_ignore_ascii_case(zone) =>
            {
                fqdn[..at].to_string()
            }
            _ => fqdn.to_string(),
        }
    }

    /// Add a record to the zone
    ///
    /// - A record for another zone is always rejected.
    /// - A second record with the same name and type is rejected unless
    ///   `replace` is set, in which case it replaces the first.
    /// - Invalid records and CNAMEs sharing a node with other records are
    ///   rejected unless `lenient` is set, in which case a warning is logged.
    pub fn add_record(&mut self, record: Record, replace: bool, lenient: bool) -> Result<()> {
        if record.zone() != self.name {
            return Err(Error::InvalidRecord {
                fqdn: record.fqdn(),
                record_type: record.record_type().to_string(),
                reasons: format!("record belongs to zone {}, not {}", record.zone(), self.name),
            });
        }

        let key = (record.name().to_string(), record.record_type());
        if !replace && self.records.contains_key(&key) {
            return Err(Error::InvalidRecord {
                fqdn: record.fqdn(),
                record_type: record.record_type().to_string(),
                reasons: "duplicate record".to_string(),
            });
        }

        let mut reasons = record.validate();

        let node_has_cname = self
            .records
            .keys()
            .any(|(name, t)| name == record.name() && *t == RecordType::Cname);
        let node_has_other = self
            .records
            .keys()
            .any(|(name, t)| name == record.name() && *t != record.record_type());
        let conflicts = if record.record_type() == RecordType::Cname {
            node_has_other
        } else {
            node_has_cname
        };
        if conflicts {
            reasons.push("CNAME cannot coexist with other records at the same node".to_string());
        }

        if !reasons.is_empty() {
            let reasons = reasons.join("; ");
            if !lenient {
                return Err(Error::InvalidRecord {
                    fqdn: record.fqdn(),
                    record_type: record.record_type().to_string(),
                    reasons,
                });
            }
            warn!(
                "Accepting invalid record {} ({}) in lenient mode: {}",
                record.fqdn(),
                record.record_type(),
                reasons
            );
        }

        self.records.insert(key, record);
        Ok(())
    }
}
