//! Core traits for zonesync
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Source`]: Populate a zone snapshot with records
//! - [`Provider`]: A source that can also filter and apply changes

pub mod source;
pub mod provider;

pub use source::{Source, SourceFactory};
pub use provider::{Provider, ProviderFactory};
