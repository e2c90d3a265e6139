//! Canonical DNS records
//!
//! A [`Record`] is the provider-agnostic representation that planning and
//! diffing operate on. Record types form a closed set; each type carries its
//! own typed value payload in [`RecordData`].
//!
//! Multi-value payloads are kept sorted and de-duplicated so that two records
//! with the same value set compare equal regardless of the order in which a
//! source produced them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Maximum length of a fully-qualified name, including the trailing dot
const MAX_FQDN_LENGTH: usize = 253;

/// Supported DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// CNAME-like record allowed at the zone root
    Alias,
    /// Certification authority authorization
    Caa,
    /// Canonical name
    Cname,
    /// Mail exchanger
    Mx,
    /// Name server delegation
    Ns,
    /// Sender policy framework
    Spf,
    /// Free-form text
    Txt,
}

impl RecordType {
    /// Every supported record type
    pub const ALL: [RecordType; 9] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Alias,
        RecordType::Caa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Spf,
        RecordType::Txt,
    ];

    /// The record type as it appears in zone files and APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Alias => "ALIAS",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Spf => "SPF",
            RecordType::Txt => "TXT",
        }
    }

    /// Whether records of this type carry exactly one value
    pub fn is_single_value(&self) -> bool {
        matches!(self, RecordType::Alias | RecordType::Cname)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::codec(format!("Unsupported record type: {}", s)))
    }
}

/// Value of a CAA record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaaValue {
    /// Issuer critical flags
    #[serde(default)]
    pub flags: u8,
    /// Property tag (issue, issuewild, iodef)
    pub tag: String,
    /// Property value
    pub value: String,
}

impl CaaValue {
    /// Create a new CAA value
    pub fn new(flags: u8, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flags,
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// Value of an MX record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MxValue {
    /// Lower is preferred
    pub preference: u16,
    /// Fully-qualified mail exchanger
    pub exchange: String,
}

impl MxValue {
    /// Create a new MX value
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Typed record payload
///
/// Serialized adjacently tagged, e.g. `{"type": "A", "value": ["1.2.3.4"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum RecordData {
    A(Vec<String>),
    Aaaa(Vec<String>),
    Alias(String),
    Caa(Vec<CaaValue>),
    Cname(String),
    Mx(Vec<MxValue>),
    Ns(Vec<String>),
    Spf(Vec<String>),
    Txt(Vec<String>),
}

impl RecordData {
    /// Build record data from a loosely shaped JSON value
    ///
    /// Multi-value types accept either a single value or an array.
    pub fn from_json(record_type: RecordType, value: serde_json::Value) -> Result<Self> {
        let value = match value {
            serde_json::Value::Array(_) => value,
            single if !record_type.is_single_value() => serde_json::Value::Array(vec![single]),
            single => single,
        };

        let tagged = serde_json::json!({
            "type": record_type.as_str(),
            "value": value,
        });
        Ok(serde_json::from_value::<RecordData>(tagged)?.normalized())
    }

    /// The record type this payload belongs to
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::Aaaa,
            RecordData::Alias(_) => RecordType::Alias,
            RecordData::Caa(_) => RecordType::Caa,
            RecordData::Cname(_) => RecordType::Cname,
            RecordData::Mx(_) => RecordType::Mx,
            RecordData::Ns(_) => RecordType::Ns,
            RecordData::Spf(_) => RecordType::Spf,
            RecordData::Txt(_) => RecordType::Txt,
        }
    }

    /// Number of values carried
    pub fn len(&self) -> usize {
        match self {
            RecordData::Alias(_) | RecordData::Cname(_) => 1,
            RecordData::A(v)
            | RecordData::Aaaa(v)
            | RecordData::Ns(v)
            | RecordData::Spf(v)
            | RecordData::Txt(v) => v.len(),
            RecordData::Caa(v) => v.len(),
            RecordData::Mx(v) => v.len(),
        }
    }

    /// Whether no values are carried
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort and de-duplicate multi-value payloads
    pub fn normalized(self) -> Self {
        fn sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
            values.sort();
            values.dedup();
            values
        }

        match self {
            RecordData::A(v) => RecordData::A(sorted(v)),
            RecordData::Aaaa(v) => RecordData::Aaaa(sorted(v)),
            RecordData::Caa(v) => RecordData::Caa(sorted(v)),
            RecordData::Mx(v) => RecordData::Mx(sorted(v)),
            RecordData::Ns(v) => RecordData::Ns(sorted(v)),
            RecordData::Spf(v) => RecordData::Spf(sorted(v)),
            RecordData::Txt(v) => RecordData::Txt(sorted(v)),
            single @ (RecordData::Alias(_) | RecordData::Cname(_)) => single,
        }
    }
}

/// A canonical DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    zone: String,
    name: String,
    ttl: u32,
    data: RecordData,
}

impl Record {
    /// Create a record in `zone` (fully-qualified, trailing dot added if
    /// missing) with a name relative to it ("" for the zone root)
    ///
    /// Zone and name are lowercased; DNS names compare case-insensitively.
    pub fn new(
        zone: impl Into<String>,
        name: impl Into<String>,
        ttl: u32,
        data: RecordData,
    ) -> Self {
        let mut zone = zone.into().to_ascii_lowercase();
        if !zone.ends_with('.') {
            zone.push('.');
        }

        Self {
            zone,
            name: name.into().to_ascii_lowercase(),
            ttl,
            data: data.normalized(),
        }
    }

    /// Fully-qualified name of the owning zone
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Name relative to the zone
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time-to-live in seconds
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Typed values
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Record type
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Fully-qualified name with trailing dot
    pub fn fqdn(&self) -> String {
        if self.name.is_empty() {
            self.zone.clone()
        } else {
            format!("{}.{}", self.name, self.zone)
        }
    }

    /// Same record with a different TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Check the record for semantic problems
    ///
    /// Returns one human-readable reason per problem; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut reasons = Vec::new();

        if self.fqdn().len() > MAX_FQDN_LENGTH {
            reasons.push(format!(
                "invalid fqdn, \"{}\" is too long at {} chars, max is {}",
                self.fqdn(),
                self.fqdn().len(),
                MAX_FQDN_LENGTH
            ));
        }

        if self.data.is_empty() {
            reasons.push("missing value(s)".to_string());
        }

        match &self.data {
            RecordData::A(values) => {
                for value in values {
                    if value.parse::<Ipv4Addr>().is_err() {
                        reasons.push(format!("invalid IPv4 address \"{}\"", value));
                    }
                }
            }
            RecordData::Aaaa(values) => {
                for value in values {
                    if value.parse::<Ipv6Addr>().is_err() {
                        reasons.push(format!("invalid IPv6 address \"{}\"", value));
                    }
                }
            }
            RecordData::Alias(value) => {
                if !self.name.is_empty() {
                    reasons.push("non-root ALIAS not allowed".to_string());
                }
                check_fully_qualified("ALIAS value", value, &mut reasons);
            }
            RecordData::Cname(value) => {
                if self.name.is_empty() {
                    reasons.push("root CNAME not allowed".to_string());
                }
                check_fully_qualified("CNAME value", value, &mut reasons);
            }
            RecordData::Caa(values) => {
                for value in values {
                    if value.tag.is_empty() {
                        reasons.push("missing CAA tag".to_string());
                    }
                }
            }
            RecordData::Mx(values) => {
                for value in values {
                    check_fully_qualified("MX exchange", &value.exchange, &mut reasons);
                }
            }
            RecordData::Ns(values) => {
                for value in values {
                    check_fully_qualified("NS value", value, &mut reasons);
                }
            }
            RecordData::Txt(values) => {
                for value in values {
                    if has_unescaped_semicolon(value) {
                        reasons.push(format!("unescaped ; in \"{}\"", value));
                    }
                }
            }
            RecordData::Spf(_) => {}
        }

        reasons
    }
}

fn check_fully_qualified(what: &str, value: &str, reasons: &mut Vec<String>) {
    if value.is_empty() {
        reasons.push(format!("empty {}", what));
    } else if !value.ends_with('.') {
        reasons.push(format!("{} \"{}\" missing trailing .", what, value));
    }
}

/// A `;` counts as escaped when a backslash sits directly before it
fn has_unescaped_semicolon(value: &str) -> bool {
    let mut prev = None;
    for c in value.chars() {
        if c == ';' && prev != Some('\\') {
            return true;
        }
        prev = Some(c);
    }
    false
}
