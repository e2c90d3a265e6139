// # zonesync-core
//
// Core library for synchronizing desired DNS zone state to remote providers.
//
// ## Architecture Overview
//
// - **Record / Zone**: Canonical, provider-agnostic zone snapshots
// - **Source**: Trait for anything that fills a zone snapshot
// - **Provider**: A source that can also filter and apply changes
// - **Plan / Change**: The diff between an existing and a desired zone
// - **Registry**: Plugin-based registry for providers and sources
//
// ## Flow
//
// 1. Sources populate the desired zone, in order
// 2. The target provider populates the existing zone and plans the changes
// 3. The provider applies the plan, one remote call at a time
//
// Nothing here retries. A sync that fails partway is recovered by running
// it again against the now-current remote state.

pub mod config;
pub mod error;
pub mod plan;
pub mod record;
pub mod registry;
pub mod sources;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::{ProviderConfig, SourceConfig, SyncConfig, ZoneConfig};
pub use error::{Error, Result};
pub use plan::{Change, Plan};
pub use record::{CaaValue, MxValue, Record, RecordData, RecordType};
pub use registry::Registry;
pub use sources::FileSource;
pub use traits::{Provider, ProviderFactory, Source, SourceFactory};
pub use zone::Zone;
