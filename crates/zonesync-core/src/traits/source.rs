// # Source Trait
//
// Defines the interface for anything that can fill a zone snapshot.
//
// ## Implementations
//
// - JSON zone files: `zonesync_core::sources::FileSource`
// - Remote providers: every `Provider` is also a `Source`
// - Derived records: `zonesync-source-acme` (challenge CNAMEs)
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{Source, Zone};
//
// let mut zone = Zone::new("example.com.");
// source.populate(&mut zone, false, false).await?;
// ```

use async_trait::async_trait;

use crate::record::RecordType;
use crate::zone::Zone;

/// Trait for record sources
///
/// Sources are applied in order to the same zone; later sources may add to
/// or replace what earlier ones produced.
#[async_trait]
pub trait Source: Send + Sync {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Whether this source handles records of the given type
    fn supports(&self, record_type: RecordType) -> bool;

    /// Add this source's records to `zone`
    ///
    /// # Parameters
    ///
    /// - `zone`: The zone snapshot to fill
    /// - `target`: The zone is being populated as a plan target (existing state)
    /// - `lenient`: Accept records that fail validation, logging a warning
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The zone exists in this source
    /// - `Ok(false)`: The zone does not exist (yet); nothing was added
    /// - `Err(Error)`: Fetching or decoding failed
    async fn populate(&self, zone: &mut Zone, target: bool, lenient: bool)
        -> Result<bool, crate::Error>;
}

/// Helper trait for constructing sources from configuration
pub trait SourceFactory: Send + Sync {
    /// Create a Source instance from configuration
    fn create(
        &self,
        config: &crate::config::SourceConfig,
    ) -> Result<Box<dyn Source>, crate::Error>;
}
