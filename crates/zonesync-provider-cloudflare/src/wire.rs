//! Cloudflare wire model
//!
//! [`WireRecord`] is what the API returns when listing a zone, including the
//! provider-assigned id. [`WireFragment`] is the body we send when creating
//! or updating a record. Field names are fixed by the API.

use serde::{Deserialize, Serialize};
use std::fmt;
use zonesync_core::RecordType;

/// Record types as Cloudflare stores them
///
/// There is no ALIAS on the wire: Cloudflare gives a root CNAME ALIAS
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Ns,
    Spf,
    Txt,
}

impl WireType {
    /// The type string used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::A => "A",
            WireType::Aaaa => "AAAA",
            WireType::Caa => "CAA",
            WireType::Cname => "CNAME",
            WireType::Mx => "MX",
            WireType::Ns => "NS",
            WireType::Spf => "SPF",
            WireType::Txt => "TXT",
        }
    }

    /// Parse an API type string; `None` for types we do not manage
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(WireType::A),
            "AAAA" => Some(WireType::Aaaa),
            "CAA" => Some(WireType::Caa),
            "CNAME" => Some(WireType::Cname),
            "MX" => Some(WireType::Mx),
            "NS" => Some(WireType::Ns),
            "SPF" => Some(WireType::Spf),
            "TXT" => Some(WireType::Txt),
            _ => None,
        }
    }

    /// Whether the API drops the trailing dot from this type's content
    pub fn strips_trailing_dot(&self) -> bool {
        matches!(self, WireType::Cname | WireType::Mx | WireType::Ns)
    }

    /// Canonical type for records of this wire type at `name`
    ///
    /// A CNAME at the zone root is reported as ALIAS.
    pub fn canonical(&self, name: &str) -> RecordType {
        match self {
            WireType::A => RecordType::A,
            WireType::Aaaa => RecordType::Aaaa,
            WireType::Caa => RecordType::Caa,
            WireType::Cname if name.is_empty() => RecordType::Alias,
            WireType::Cname => RecordType::Cname,
            WireType::Mx => RecordType::Mx,
            WireType::Ns => RecordType::Ns,
            WireType::Spf => RecordType::Spf,
            WireType::Txt => RecordType::Txt,
        }
    }
}

impl From<RecordType> for WireType {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => WireType::A,
            RecordType::Aaaa => WireType::Aaaa,
            RecordType::Alias | RecordType::Cname => WireType::Cname,
            RecordType::Caa => WireType::Caa,
            RecordType::Mx => WireType::Mx,
            RecordType::Ns => WireType::Ns,
            RecordType::Spf => WireType::Spf,
            RecordType::Txt => WireType::Txt,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured CAA payload (`data` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaaData {
    pub flags: u8,
    pub tag: String,
    pub value: String,
}

/// A record as listed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    /// Provider-assigned record id
    pub id: String,
    /// Id of the owning zone
    pub zone_id: String,
    /// Fully-qualified name without trailing dot
    pub name: String,
    /// Type string; may name types we do not manage (SRV, PTR, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: u32,
    #[serde(default)]
    pub content: String,
    /// MX only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Structured payload; shape depends on the type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl WireRecord {
    /// Parsed wire type, if it is one we manage
    pub fn wire_type(&self) -> Option<WireType> {
        WireType::parse(&self.record_type)
    }
}

/// Type-specific part of a record body
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum WirePayload {
    /// Flat content (A, AAAA, CNAME, NS, SPF, TXT)
    Content { content: String },
    /// MX
    Mx { priority: u16, content: String },
    /// CAA
    Caa { data: CaaData },
}

/// A record body for create and update calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WireFragment {
    /// Fully-qualified name without trailing dot
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: WireType,
    pub ttl: u32,
    #[serde(flatten)]
    pub payload: WirePayload,
}

/// A zone as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneSummary {
    pub id: String,
    /// Zone name without trailing dot
    pub name: String,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of items on this page (`result_info.count`)
    pub count: usize,
    /// Page size (`result_info.per_page`)
    pub per_page: usize,
}

impl<T> Page<T> {
    /// A full page means there may be more after it
    pub fn has_more(&self) -> bool {
        self.count > 0 && self.count == self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_serializes_flat() {
        let fragment = WireFragment {
            name: "example.com".to_string(),
            record_type: WireType::Mx,
            ttl: 300,
            payload: WirePayload::Mx {
                priority: 10,
                content: "mx.example.com.".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            serde_json::json!({
                "name": "example.com",
                "type": "MX",
                "ttl": 300,
                "priority": 10,
                "content": "mx.example.com.",
            })
        );
    }

    #[test]
    fn test_caa_fragment_serializes_nested_data() {
        let fragment = WireFragment {
            name: "example.com".to_string(),
            record_type: WireType::Caa,
            ttl: 120,
            payload: WirePayload::Caa {
                data: CaaData {
                    flags: 0,
                    tag: "issue".to_string(),
                    value: "letsencrypt.org".to_string(),
                },
            },
        };

        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            serde_json::json!({
                "name": "example.com",
                "type": "CAA",
                "ttl": 120,
                "data": {"flags": 0, "tag": "issue", "value": "letsencrypt.org"},
            })
        );
    }

    #[test]
    fn test_wire_record_tolerates_unmanaged_types() {
        let record: WireRecord = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "zone_id": "z1",
            "name": "_sip._tcp.example.com",
            "type": "SRV",
            "ttl": 1,
            "content": "10 5060 sip.example.com",
            "data": {"priority": 10, "weight": 5, "port": 5060, "target": "sip.example.com"},
        }))
        .unwrap();

        assert_eq!(record.wire_type(), None);
    }

    #[test]
    fn test_alias_maps_to_cname_and_back() {
        assert_eq!(WireType::from(RecordType::Alias), WireType::Cname);
        assert_eq!(WireType::Cname.canonical(""), RecordType::Alias);
        assert_eq!(WireType::Cname.canonical("www"), RecordType::Cname);
    }

    #[test]
    fn test_page_has_more() {
        let full = Page { items: vec![1, 2], count: 2, per_page: 2 };
        assert!(full.has_more());

        let partial = Page { items: vec![1], count: 1, per_page: 2 };
        assert!(!partial.has_more());

        let empty: Page<u8> = Page { items: vec![], count: 0, per_page: 0 };
        assert!(!empty.has_more());
    }
}
