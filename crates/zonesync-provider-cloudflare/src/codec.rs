//! Wire record codec
//!
//! Maps between canonical [`Record`]s and Cloudflare's flat per-value wire
//! records. Dispatch is a match on the closed record type set.
//!
//! - `decode` takes every wire record sharing one name and type and builds
//!   the canonical payload. The first record's TTL stands in for the set.
//! - `encode` produces one [`WireFragment`] per value (one in total for
//!   CNAME/ALIAS), decorated with the stripped name, the wire type and the
//!   TTL clamped to the provider minimum.

use crate::wire::{CaaData, WireFragment, WirePayload, WireRecord, WireType};
use tracing::warn;
use zonesync_core::{CaaValue, Error, MxValue, Record, RecordData, RecordType, Result};

/// Build canonical record data from wire records sharing a name and type
///
/// Returns the representative TTL and the typed payload.
pub fn decode(record_type: RecordType, records: &[WireRecord]) -> Result<(u32, RecordData)> {
    let first = records
        .first()
        .ok_or_else(|| Error::codec(format!("No wire records to decode as {}", record_type)))?;
    let ttl = first.ttl;

    let contents = || records.iter().map(|r| r.content.clone()).collect::<Vec<_>>();

    let data = match record_type {
        RecordType::A => RecordData::A(contents()),
        RecordType::Aaaa => RecordData::Aaaa(contents()),
        RecordType::Spf => RecordData::Spf(contents()),
        RecordType::Ns => RecordData::Ns(records.iter().map(|r| fully_qualified(&r.content)).collect()),
        RecordType::Txt => RecordData::Txt(records.iter().map(|r| r.content.replace(';', "\\;")).collect()),
        RecordType::Caa => RecordData::Caa(
            records
                .iter()
                .map(caa_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        RecordType::Cname | RecordType::Alias => {
            if records.len() > 1 {
                warn!(
                    "decode: {} {} records at {}, using the first",
                    records.len(),
                    record_type,
                    first.name
                );
            }
            let target = fully_qualified(&first.content);
            if record_type == RecordType::Alias {
                RecordData::Alias(target)
            } else {
                RecordData::Cname(target)
            }
        }
        RecordType::Mx => RecordData::Mx(
            records
                .iter()
                .map(|r| {
                    let preference = r.priority.ok_or_else(|| {
                        Error::codec(format!("MX record {} ({}) has no priority", r.name, r.id))
                    })?;
                    Ok(MxValue::new(preference, fully_qualified(&r.content)))
                })
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    Ok((ttl, data))
}

/// Build the wire bodies for a canonical record
pub fn encode(record: &Record, min_ttl: u32) -> Vec<WireFragment> {
    let fqdn = record.fqdn();
    let name = fqdn.trim_end_matches('.');
    let record_type = WireType::from(record.record_type());
    let ttl = record.ttl().max(min_ttl);

    let content = |content: &str| WirePayload::Content {
        content: content.to_string(),
    };

    let payloads: Vec<WirePayload> = match record.data() {
        RecordData::A(values)
        | RecordData::Aaaa(values)
        | RecordData::Ns(values)
        | RecordData::Spf(values) => values.iter().map(|v| content(v.as_str())).collect(),
        RecordData::Txt(values) => values.iter().map(|v| content(&v.replace("\\;", ";"))).collect(),
        RecordData::Alias(target) | RecordData::Cname(target) => vec![content(target.as_str())],
        RecordData::Caa(values) => values
            .iter()
            .map(|v| WirePayload::Caa {
                data: CaaData {
                    flags: v.flags,
                    tag: v.tag.clone(),
                    value: v.value.clone(),
                },
            })
            .collect(),
        RecordData::Mx(values) => values
            .iter()
            .map(|v| WirePayload::Mx {
                priority: v.preference,
                content: v.exchange.clone(),
            })
            .collect(),
    };

    payloads
        .into_iter()
        .map(|payload| WireFragment {
            name: name.to_string(),
            record_type,
            ttl,
            payload,
        })
        .collect()
}

/// Parse the structured `data` payload of a CAA wire record
pub fn caa_data(record: &WireRecord) -> Result<CaaData> {
    let data = record
        .data
        .as_ref()
        .ok_or_else(|| Error::codec(format!("CAA record {} ({}) has no data", record.name, record.id)))?;

    serde_json::from_value(data.clone()).map_err(|e| {
        Error::codec(format!(
            "CAA record {} ({}) has malformed data: {}",
            record.name, record.id, e
        ))
    })
}

fn caa_value(record: &WireRecord) -> Result<CaaValue> {
    let data = caa_data(record)?;
    Ok(CaaValue::new(data.flags, data.tag, data.value))
}

/// Content with exactly one trailing dot
pub(crate) fn fully_qualified(content: &str) -> String {
    if content.ends_with('.') {
        content.to_string()
    } else {
        format!("{}.", content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: &str = "example.com.";

    fn wire(name: &str, record_type: &str, ttl: u32, content: &str) -> WireRecord {
        WireRecord {
            id: format!("id-{}", content),
            zone_id: "zone-1".to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl,
            content: content.to_string(),
            priority: None,
            data: None,
        }
    }

    /// Decode the fragments of `record` as if the API had stored them
    fn round_trip(record: &Record) -> Record {
        let stored: Vec<WireRecord> = encode(record, 0)
            .into_iter()
            .map(|f| {
                let mut w = wire(&f.name, f.record_type.as_str(), f.ttl, "");
                match f.payload {
                    WirePayload::Content { content } if f.record_type.strips_trailing_dot() => {
                        w.content = content.trim_end_matches('.').to_string();
                    }
                    WirePayload::Content { content } => {
                        w.content = content;
                    }
                    WirePayload::Mx { priority, content } => {
                        w.priority = Some(priority);
                        w.content = content.trim_end_matches('.').to_string();
                    }
                    WirePayload::Caa { data } => {
                        w.data = Some(serde_json::to_value(data).unwrap());
                    }
                }
                w
            })
            .collect();

        let record_type = stored[0].wire_type().unwrap().canonical(record.name());
        let (ttl, data) = decode(record_type, &stored).unwrap();
        Record::new(ZONE, record.name(), ttl, data)
    }

    #[test]
    fn test_round_trip_every_type() {
        let records = vec![
            Record::new(ZONE, "", 300, RecordData::A(vec!["1.2.3.4".into(), "1.2.3.5".into()])),
            Record::new(ZONE, "v6", 300, RecordData::Aaaa(vec!["2001:db8::1".into()])),
            Record::new(ZONE, "", 300, RecordData::Alias("lb.example.net.".into())),
            Record::new(
                ZONE,
                "",
                300,
                RecordData::Caa(vec![
                    CaaValue::new(0, "issue", "letsencrypt.org"),
                    CaaValue::new(0, "iodef", "mailto:security@example.com"),
                ]),
            ),
            Record::new(ZONE, "www", 300, RecordData::Cname("example.com.".into())),
            Record::new(
                ZONE,
                "",
                300,
                RecordData::Mx(vec![MxValue::new(10, "mx1.example.com."), MxValue::new(20, "mx2.example.com.")]),
            ),
            Record::new(ZONE, "sub", 300, RecordData::Ns(vec!["ns1.example.net.".into(), "ns2.example.net.".into()])),
            Record::new(ZONE, "", 300, RecordData::Spf(vec!["v=spf1 -all".into()])),
            Record::new(ZONE, "txt", 300, RecordData::Txt(vec!["v=DKIM1\\; k=rsa".into(), "plain".into()])),
        ];

        for record in records {
            assert_eq!(round_trip(&record), record, "round trip of {}", record.record_type());
        }
    }

    #[test]
    fn test_decode_uses_first_ttl() {
        let records = vec![wire("example.com", "A", 300, "1.1.1.1"), wire("example.com", "A", 600, "2.2.2.2")];
        let (ttl, data) = decode(RecordType::A, &records).unwrap();
        assert_eq!(ttl, 300);
        assert_eq!(data, RecordData::A(vec!["1.1.1.1".into(), "2.2.2.2".into()]));
    }

    #[test]
    fn test_decode_escapes_txt_semicolons() {
        let records = vec![wire("example.com", "TXT", 300, "v=DKIM1; k=rsa")];
        let (_, data) = decode(RecordType::Txt, &records).unwrap();
        assert_eq!(data, RecordData::Txt(vec!["v=DKIM1\\; k=rsa".into()]));
    }

    #[test]
    fn test_decode_cname_appends_trailing_dot() {
        let records = vec![wire("www.example.com", "CNAME", 300, "target.example.net")];
        let (_, data) = decode(RecordType::Cname, &records).unwrap();
        assert_eq!(data, RecordData::Cname("target.example.net.".into()));

        let (_, data) = decode(RecordType::Alias, &records).unwrap();
        assert_eq!(data, RecordData::Alias("target.example.net.".into()));
    }

    #[test]
    fn test_decode_mx_requires_priority() {
        let records = vec![wire("example.com", "MX", 300, "mx.example.com")];
        assert!(matches!(decode(RecordType::Mx, &records), Err(Error::Codec(_))));

        let mut with_priority = records.clone();
        with_priority[0].priority = Some(5);
        let (_, data) = decode(RecordType::Mx, &with_priority).unwrap();
        assert_eq!(data, RecordData::Mx(vec![MxValue::new(5, "mx.example.com.")]));
    }

    #[test]
    fn test_decode_caa_requires_data() {
        let records = vec![wire("example.com", "CAA", 300, "0 issue \"letsencrypt.org\"")];
        assert!(matches!(decode(RecordType::Caa, &records), Err(Error::Codec(_))));
    }

    #[test]
    fn test_decode_empty_is_codec_error() {
        assert!(matches!(decode(RecordType::A, &[]), Err(Error::Codec(_))));
    }

    #[test]
    fn test_encode_alias_as_root_cname() {
        let alias = Record::new(ZONE, "", 300, RecordData::Alias("lb.example.net.".into()));
        let fragments = encode(&alias, 120);
        assert_eq!(
            fragments,
            vec![WireFragment {
                name: "example.com".into(),
                record_type: WireType::Cname,
                ttl: 300,
                payload: WirePayload::Content {
                    content: "lb.example.net.".into()
                },
            }]
        );
    }

    #[test]
    fn test_encode_clamps_ttl_and_unescapes_txt() {
        let txt = Record::new(ZONE, "dkim", 60, RecordData::Txt(vec!["a\\;b".into()]));
        let fragments = encode(&txt, 120);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].ttl, 120);
        assert_eq!(fragments[0].name, "dkim.example.com");
        assert_eq!(
            fragments[0].payload,
            WirePayload::Content { content: "a;b".into() }
        );
    }

    #[test]
    fn test_encode_one_fragment_per_value() {
        let a = Record::new(ZONE, "", 300, RecordData::A(vec!["1.1.1.1".into(), "2.2.2.2".into(), "3.3.3.3".into()]));
        assert_eq!(encode(&a, 120).len(), 3);
    }
}
