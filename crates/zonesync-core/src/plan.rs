//! Changes and plans
//!
//! The planner compares an existing zone snapshot (as populated from a
//! target provider) with the desired snapshot and produces an ordered list
//! of [`Change`]s. Each candidate change is offered to the target's
//! [`Provider::include_change`] filter before it lands in the plan.

use crate::record::Record;
use crate::traits::Provider;
use crate::zone::Zone;
use tracing::{debug, warn};

/// A single abstract change to a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Record is desired but does not exist
    Create(Record),
    /// Record exists with different data
    Update {
        /// What the target currently holds
        existing: Record,
        /// What should replace it
        new: Record,
    },
    /// Record exists but is no longer desired
    Delete(Record),
}

impl Change {
    /// The record this change is about: the new record for creates and
    /// updates, the existing one for deletes
    pub fn record(&self) -> &Record {
        match self {
            Change::Create(new) | Change::Update { new, .. } => new,
            Change::Delete(existing) => existing,
        }
    }

    /// Short change kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Create(_) => "Create",
            Change::Update { .. } => "Update",
            Change::Delete(_) => "Delete",
        }
    }
}

/// The changes required to bring a target zone to its desired state
#[derive(Debug, Clone)]
pub struct Plan {
    /// Existing zone as populated from the target
    pub existing: Zone,
    /// Desired zone
    pub desired: Zone,
    /// Ordered changes: deletes and updates first, then creates
    pub changes: Vec<Change>,
}

impl Plan {
    /// Name of the zone the plan applies to
    pub fn zone_name(&self) -> &str {
        self.desired.name()
    }

    /// Whether there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Zone {
    /// Compute the changes needed to turn `self` into `desired` on `target`
    ///
    /// Record types the target does not support are skipped.
    pub fn changes<P>(&self, desired: &Zone, target: &P) -> Vec<Change>
    where
        P: Provider + ?Sized,
    {
        let mut changes = Vec::new();

        for existing in self.records() {
            if !target.supports(existing.record_type()) {
                debug!(
                    "changes: skipping {} ({}), not supported by {}",
                    existing.fqdn(),
                    existing.record_type(),
                    target.id()
                );
                continue;
            }

            let change = match desired.get(existing.name(), existing.record_type()) {
                None => Change::Delete(existing.clone()),
                Some(new) if new != existing => Change::Update {
                    existing: existing.clone(),
                    new: new.clone(),
                },
                Some(_) => continue,
            };

            if target.include_change(&change) {
                changes.push(change);
            }
        }

        for new in desired.records() {
            if self.get(new.name(), new.record_type()).is_some() {
                continue;
            }
            if !target.supports(new.record_type()) {
                warn!(
                    "changes: {} does not support {} records, skipping {}",
                    target.id(),
                    new.record_type(),
                    new.fqdn()
                );
                continue;
            }

            let change = Change::Create(new.clone());
            if target.include_change(&change) {
                changes.push(change);
            }
        }

        changes
    }
}
