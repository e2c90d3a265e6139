//! Zone provisioner
//!
//! Applies a plan to one zone: creates the zone if it is missing, then
//! realizes every change in plan order through the reconciliation engine.

use tracing::debug;
use zonesync_core::{Change, Error, Plan, Result};

use crate::directory::ZoneDirectory;
use crate::reconcile::{WireCall, create_calls, delete_calls, execute, update_calls};

/// Apply `plan`, returning the number of changes applied
///
/// The zone's record cache is evicted afterwards whether or not every call
/// succeeded.
pub async fn apply(directory: &ZoneDirectory, plan: &Plan, min_ttl: u32) -> Result<usize> {
    let zone_name = plan.zone_name();
    debug!("apply: zone={}, changes={}", zone_name, plan.changes.len());

    let result = apply_changes(directory, plan, min_ttl).await;
    directory.invalidate(zone_name).await;
    result
}

async fn apply_changes(directory: &ZoneDirectory, plan: &Plan, min_ttl: u32) -> Result<usize> {
    let zone_name = plan.zone_name();
    let zone_id = ensure_zone(directory, zone_name).await?;

    for change in &plan.changes {
        let calls = calls_for(directory, &zone_id, zone_name, change, min_ttl).await?;
        debug!(
            "apply: {} {} {}: {} call(s)",
            change.kind(),
            change.record().fqdn(),
            change.record().record_type(),
            calls.len()
        );
        execute(directory.api().as_ref(), &calls).await?;
    }

    Ok(plan.changes.len())
}

/// Id of the zone, creating it remotely if it does not exist yet
async fn ensure_zone(directory: &ZoneDirectory, zone_name: &str) -> Result<String> {
    if let Some(zone_id) = directory.zone_id(zone_name).await? {
        return Ok(zone_id);
    }

    debug!("apply:   no matching zone, creating {}", zone_name);
    let zone_id = directory
        .api()
        .create_zone(zone_name.trim_end_matches('.'))
        .await?;
    if zone_id.is_empty() {
        return Err(Error::provider("cloudflare", format!("Zone {} created without an id", zone_name)));
    }

    directory.insert_zone(zone_name, &zone_id).await;
    Ok(zone_id)
}

async fn calls_for(
    directory: &ZoneDirectory,
    zone_id: &str,
    zone_name: &str,
    change: &Change,
    min_ttl: u32,
) -> Result<Vec<WireCall>> {
    match change {
        Change::Create(new) => Ok(create_calls(zone_id, new, min_ttl)),
        Change::Delete(existing) => {
            let live = directory.records(zone_name).await?;
            Ok(delete_calls(existing, &live))
        }
        Change::Update { existing, new } => {
            let live = directory.records(zone_name).await?;
            update_calls(zone_id, existing, new, &live, min_ttl)
        }
    }
}
