// # Provider Trait
//
// Defines the interface for pushing a desired zone state to a remote DNS
// service.
//
// ## Implementations
//
// - Cloudflare: `zonesync-provider-cloudflare` crate
//
// ## Flow
//
// 1. `plan()` populates the existing zone from the provider (`target = true`)
// 2. The planner diffs existing vs desired and asks `include_change()` about
//    every candidate
// 3. `apply()` turns the surviving changes into API calls
//
// Providers never retry. A failed call is returned to the caller, who can
// re-run the whole sync against the now-current remote state.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::plan::{Change, Plan};
use crate::traits::Source;
use crate::zone::Zone;

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks. Concurrent `apply`
/// calls for the same zone are not coordinated by the provider; run one
/// sync per zone at a time.
#[async_trait]
pub trait Provider: Source {
    /// Decide whether a computed change should be applied at all
    ///
    /// The default accepts everything.
    fn include_change(&self, change: &Change) -> bool {
        let _ = change;
        true
    }

    /// Apply a plan, returning the number of changes applied
    async fn apply(&self, plan: &Plan) -> Result<usize, crate::Error>;

    /// Build the plan that would bring this provider's copy of the zone to
    /// `desired`
    ///
    /// Returns `Ok(None)` when the provider is already in sync.
    async fn plan(&self, desired: &Zone) -> Result<Option<Plan>, crate::Error> {
        let mut existing = Zone::new(desired.name());
        let exists = self.populate(&mut existing, true, true).await?;
        if !exists {
            debug!("plan: zone {} does not exist on {}", desired.name(), self.id());
        }

        let changes = existing.changes(desired, self);
        info!(
            "plan: zone {} on {}: {} change(s)",
            desired.name(),
            self.id(),
            changes.len()
        );

        if changes.is_empty() {
            return Ok(None);
        }

        Ok(Some(Plan {
            existing,
            desired: desired.clone(),
            changes,
        }))
    }
}

/// Helper trait for constructing providers from configuration
pub trait ProviderFactory: Send + Sync {
    /// Create a Provider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn Provider>, crate::Error>;
}
