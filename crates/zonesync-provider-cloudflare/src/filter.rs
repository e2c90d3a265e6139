//! Change filter
//!
//! Drops changes the provider must never apply or that would only churn.

use tracing::debug;
use zonesync_core::{Change, RecordType};

/// Whether `change` should be applied by a provider enforcing `min_ttl`
///
/// - Root NS records belong to the provider and are never touched.
/// - An update whose only difference is a TTL below the floor, with the
///   existing record already at the floor, is a no-op.
pub fn include_change(change: &Change, min_ttl: u32) -> bool {
    let record = change.record();
    if record.record_type() == RecordType::Ns && record.name().is_empty() {
        debug!("include_change: skipping root NS of {}", record.zone());
        return false;
    }

    if let Change::Update { existing, new } = change {
        let clamped = new.clone().with_ttl(new.ttl().max(min_ttl));
        if &clamped == existing {
            debug!(
                "include_change: {} {} only differs below the TTL floor",
                new.fqdn(),
                new.record_type()
            );
            return false;
        }
    }

    true
}
