//! Reconciliation engine
//!
//! Turns one filtered [`Change`](zonesync_core::Change) into the ordered
//! list of wire calls that realizes it. Computing the calls is pure; the
//! calls are then executed strictly one after another because the API has
//! no transactions.
//!
//! Updates prefer swapping content into an existing record id over a
//! delete followed by a create. A swap never leaves the name without a
//! record and never trips duplicate-content validation on the remote side.
//!
//! The live record listing is ground truth. Fragments already present live
//! are never created again and records that do not carry a wanted fragment
//! are reused or removed, so running the same update twice makes no calls
//! the second time.

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::debug;
use zonesync_core::{Record, Result};

use crate::client::CloudflareApi;
use crate::codec::encode;
use crate::fingerprint::Fingerprint;
use crate::wire::{WireFragment, WireRecord, WireType};

/// One mutating API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireCall {
    Create {
        zone_id: String,
        fragment: WireFragment,
    },
    /// In-place content swap on an existing record id
    Update {
        zone_id: String,
        record_id: String,
        fragment: WireFragment,
    },
    Delete {
        zone_id: String,
        record_id: String,
    },
}

impl WireCall {
    /// Short call kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            WireCall::Create { .. } => "create",
            WireCall::Update { .. } => "update",
            WireCall::Delete { .. } => "delete",
        }
    }
}

/// Live records with the same name and wire type as `record`
///
/// ALIAS matches its live CNAME.
pub fn matching_live<'a>(record: &Record, live: &'a [WireRecord]) -> Vec<&'a WireRecord> {
    let fqdn = record.fqdn();
    let name = fqdn.trim_end_matches('.');
    let wire_type = WireType::from(record.record_type());

    live.iter()
        .filter(|r| r.name.eq_ignore_ascii_case(name) && r.wire_type() == Some(wire_type))
        .collect()
}

/// One create call per encoded fragment
pub fn create_calls(zone_id: &str, record: &Record, min_ttl: u32) -> Vec<WireCall> {
    encode(record, min_ttl)
        .into_iter()
        .map(|fragment| {
            debug!("create: add {} {}", fragment.name, fragment.record_type);
            WireCall::Create {
                zone_id: zone_id.to_string(),
                fragment,
            }
        })
        .collect()
}

/// One delete call per live record matching `record`
pub fn delete_calls(record: &Record, live: &[WireRecord]) -> Vec<WireCall> {
    matching_live(record, live)
        .into_iter()
        .map(|r| {
            debug!("delete: remove {} {} ({})", r.name, r.record_type, r.id);
            WireCall::Delete {
                zone_id: r.zone_id.clone(),
                record_id: r.id.clone(),
            }
        })
        .collect()
}

/// Calls that turn the live records of `existing` into `new`
///
/// Live records already carrying a wanted fragment are left alone. Every
/// other live record is swapped to a pending fragment while any remain and
/// deleted otherwise. Pending fragments left over are created.
pub fn update_calls(
    zone_id: &str,
    existing: &Record,
    new: &Record,
    live: &[WireRecord],
    min_ttl: u32,
) -> Result<Vec<WireCall>> {
    let wanted: BTreeMap<Fingerprint, WireFragment> = encode(new, min_ttl)
        .into_iter()
        .map(|f| (Fingerprint::of_fragment(&f), f))
        .collect();

    let mut satisfied = HashSet::new();
    let mut unwanted = Vec::new();
    for record in matching_live(existing, live) {
        let fingerprint = Fingerprint::of_live(record)?;
        // a second live copy of a wanted fragment is surplus
        if wanted.contains_key(&fingerprint) && satisfied.insert(fingerprint) {
            debug!("update: leave {} {} ({})", record.name, record.record_type, record.id);
        } else {
            unwanted.push(record);
        }
    }

    let mut pending: VecDeque<WireFragment> = wanted
        .into_iter()
        .filter(|(fingerprint, _)| !satisfied.contains(fingerprint))
        .map(|(_, fragment)| fragment)
        .collect();

    let mut calls = Vec::new();
    for record in unwanted {
        match pending.pop_front() {
            Some(fragment) => {
                debug!("update: swap {} {} ({})", record.name, record.record_type, record.id);
                calls.push(WireCall::Update {
                    zone_id: record.zone_id.clone(),
                    record_id: record.id.clone(),
                    fragment,
                });
            }
            None => {
                debug!("update: remove {} {} ({})", record.name, record.record_type, record.id);
                calls.push(WireCall::Delete {
                    zone_id: record.zone_id.clone(),
                    record_id: record.id.clone(),
                });
            }
        }
    }

    for fragment in pending {
        debug!("update: add {} {}", fragment.name, fragment.record_type);
        calls.push(WireCall::Create {
            zone_id: zone_id.to_string(),
            fragment,
        });
    }

    Ok(calls)
}

/// Send `calls` in order, stopping at the first failure
///
/// Returns the number of calls made.
pub async fn execute(api: &dyn CloudflareApi, calls: &[WireCall]) -> Result<usize> {
    for call in calls {
        match call {
            WireCall::Create { zone_id, fragment } => {
                api.create_record(zone_id, fragment).await?;
            }
            WireCall::Update {
                zone_id,
                record_id,
                fragment,
            } => {
                api.update_record(zone_id, record_id, fragment).await?;
            }
            WireCall::Delete { zone_id, record_id } => {
                api.delete_record(zone_id, record_id).await?;
            }
        }
    }
    Ok(calls.len())
}
