//! Content fingerprints
//!
//! A [`Fingerprint`] is the mutation-relevant projection of a record body:
//! name, wire type, TTL and the type-specific payload. The id is excluded.
//! Two records hold the same logical content iff their fingerprints are
//! equal.
//!
//! Names compare case-insensitively, so the name is projected lowercase.
//!
//! The projection is a typed struct, so field order never matters and
//! equality is exact. For CNAME, MX and NS the content is normalized to end
//! in a dot: fragments we encode carry the canonical trailing dot while the
//! API lists the same content without it.

use crate::codec::{caa_data, fully_qualified};
use crate::wire::{WireFragment, WirePayload, WireRecord, WireType};
use zonesync_core::{Error, Result};

/// Order-independent identity of a record's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    name: String,
    record_type: WireType,
    ttl: u32,
    payload: WirePayload,
}

impl Fingerprint {
    /// Fingerprint of a body we are about to send
    pub fn of_fragment(fragment: &WireFragment) -> Self {
        Self::project(
            &fragment.name,
            fragment.record_type,
            fragment.ttl,
            fragment.payload.clone(),
        )
    }

    /// Fingerprint of a record as listed by the API
    ///
    /// Fails for types we do not manage and for MX/CAA records missing
    /// their structured fields.
    pub fn of_live(record: &WireRecord) -> Result<Self> {
        let record_type = record.wire_type().ok_or_else(|| {
            Error::codec(format!(
                "Cannot fingerprint {} record {} ({})",
                record.record_type, record.name, record.id
            ))
        })?;

        let payload = match record_type {
            WireType::A
            | WireType::Aaaa
            | WireType::Cname
            | WireType::Ns
            | WireType::Spf
            | WireType::Txt => WirePayload::Content {
                content: record.content.clone(),
            },
            WireType::Mx => WirePayload::Mx {
                priority: record.priority.ok_or_else(|| {
                    Error::codec(format!(
                        "MX record {} ({}) has no priority",
                        record.name, record.id
                    ))
                })?,
                content: record.content.clone(),
            },
            WireType::Caa => WirePayload::Caa {
                data: caa_data(record)?,
            },
        };

        Ok(Self::project(&record.name, record_type, record.ttl, payload))
    }

    fn project(name: &str, record_type: WireType, ttl: u32, payload: WirePayload) -> Self {
        let payload = if record_type.strips_trailing_dot() {
            match payload {
                WirePayload::Content { content } => WirePayload::Content {
                    content: fully_qualified(&content),
                },
                WirePayload::Mx { priority, content } => WirePayload::Mx {
                    priority,
                    content: fully_qualified(&content),
                },
                other => other,
            }
        } else {
            payload
        };

        Self {
            name: name.trim_end_matches('.').to_ascii_lowercase(),
            record_type,
            ttl,
            payload,
        }
    }
}
