//! Test doubles and common utilities for provider contract tests
//!
//! `FakeCloudflare` keeps zones and records in memory, pages listings like
//! the real API, records every mutating call and can be told to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use zonesync_core::{Error, Record, Result, Zone};
use zonesync_provider_cloudflare::wire::{Page, WirePayload, ZoneSummary};
use zonesync_provider_cloudflare::{CloudflareApi, WireCall, WireFragment, WireRecord};

pub const ZONE: &str = "example.com.";

#[derive(Default)]
struct State {
    zones: Vec<ZoneSummary>,
    records: Vec<WireRecord>,
    calls: Vec<WireCall>,
    created_zones: Vec<String>,
    next_id: usize,
}

/// In-memory stand-in for the Cloudflare API
pub struct FakeCloudflare {
    per_page: usize,
    state: Mutex<State>,
    zone_page_requests: AtomicUsize,
    record_page_requests: AtomicUsize,
    /// Fail the mutating call with this (0-based) index
    fail_at: Mutex<Option<usize>>,
    mutations: AtomicUsize,
}

impl FakeCloudflare {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    pub fn with_page_size(per_page: usize) -> Self {
        Self {
            per_page,
            state: Mutex::new(State::default()),
            zone_page_requests: AtomicUsize::new(0),
            record_page_requests: AtomicUsize::new(0),
            fail_at: Mutex::new(None),
            mutations: AtomicUsize::new(0),
        }
    }

    /// Add a zone (name without trailing dot), returning its id
    pub fn seed_zone(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("zone-{}", state.zones.len() + 1);
        state.zones.push(ZoneSummary {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }

    /// Add a record as the API would list it
    pub fn seed_record(&self, zone_id: &str, name: &str, record_type: &str, ttl: u32, content: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("rec-{}", state.next_id);
        state.records.push(WireRecord {
            id,
            zone_id: zone_id.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl,
            content: content.to_string(),
            priority: None,
            data: None,
        });
    }

    pub fn seed_mx(&self, zone_id: &str, name: &str, ttl: u32, priority: u16, exchange: &str) {
        self.seed_record(zone_id, name, "MX", ttl, exchange);
        let mut state = self.state.lock().unwrap();
        if let Some(last) = state.records.last_mut() {
            last.priority = Some(priority);
        }
    }

    /// Fail the `index`-th mutating call from now on (0-based)
    pub fn fail_at(&self, index: usize) {
        self.mutations.store(0, Ordering::SeqCst);
        *self.fail_at.lock().unwrap() = Some(index);
    }

    pub fn records(&self) -> Vec<WireRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn zones(&self) -> Vec<ZoneSummary> {
        self.state.lock().unwrap().zones.clone()
    }

    pub fn calls(&self) -> Vec<WireCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn created_zones(&self) -> Vec<String> {
        self.state.lock().unwrap().created_zones.clone()
    }

    pub fn zone_page_requests(&self) -> usize {
        self.zone_page_requests.load(Ordering::SeqCst)
    }

    pub fn record_page_requests(&self) -> usize {
        self.record_page_requests.load(Ordering::SeqCst)
    }

    fn page<T: Clone>(&self, items: &[T], page: u32) -> Page<T> {
        let start = (page as usize - 1) * self.per_page;
        let items: Vec<T> = items.iter().skip(start).take(self.per_page).cloned().collect();
        Page {
            count: items.len(),
            per_page: self.per_page,
            items,
        }
    }

    fn check_failure(&self) -> Result<()> {
        let index = self.mutations.fetch_add(1, Ordering::SeqCst);
        if *self.fail_at.lock().unwrap() == Some(index) {
            return Err(Error::http(500, "injected failure"));
        }
        Ok(())
    }

    /// Store a fragment the way the API does: CNAME/MX/NS lose their trailing dot
    fn store(record: &mut WireRecord, fragment: &WireFragment) {
        record.name = fragment.name.clone();
        record.record_type = fragment.record_type.as_str().to_string();
        record.ttl = fragment.ttl;
        record.priority = None;
        record.data = None;

        match &fragment.payload {
            WirePayload::Content { content } => {
                record.content = if fragment.record_type.strips_trailing_dot() {
                    content.trim_end_matches('.').to_string()
                } else {
                    content.clone()
                };
            }
            WirePayload::Mx { priority, content } => {
                record.priority = Some(*priority);
                record.content = content.trim_end_matches('.').to_string();
            }
            WirePayload::Caa { data } => {
                record.content = format!("{} {} \"{}\"", data.flags, data.tag, data.value);
                record.data = Some(serde_json::to_value(data).unwrap());
            }
        }
    }
}

#[async_trait]
impl CloudflareApi for FakeCloudflare {
    async fn list_zones(&self, page: u32) -> Result<Page<ZoneSummary>> {
        self.zone_page_requests.fetch_add(1, Ordering::SeqCst);
        let zones = self.zones();
        Ok(self.page(&zones, page))
    }

    async fn list_records(&self, zone_id: &str, page: u32) -> Result<Page<WireRecord>> {
        self.record_page_requests.fetch_add(1, Ordering::SeqCst);
        let records: Vec<WireRecord> = self
            .records()
            .into_iter()
            .filter(|r| r.zone_id == zone_id)
            .collect();
        Ok(self.page(&records, page))
    }

    async fn create_zone(&self, name: &str) -> Result<String> {
        self.check_failure()?;
        let id = self.seed_zone(name);
        self.state.lock().unwrap().created_zones.push(name.to_string());
        Ok(id)
    }

    async fn create_record(&self, zone_id: &str, fragment: &WireFragment) -> Result<()> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut record = WireRecord {
            id: format!("rec-{}", state.next_id),
            zone_id: zone_id.to_string(),
            name: String::new(),
            record_type: String::new(),
            ttl: 0,
            content: String::new(),
            priority: None,
            data: None,
        };
        Self::store(&mut record, fragment);
        state.records.push(record);
        state.calls.push(WireCall::Create {
            zone_id: zone_id.to_string(),
            fragment: fragment.clone(),
        });
        Ok(())
    }

    async fn update_record(&self, zone_id: &str, record_id: &str, fragment: &WireFragment) -> Result<()> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.zone_id == zone_id && r.id == record_id)
            .ok_or_else(|| Error::http(404, format!("no record {}", record_id)))?;
        Self::store(record, fragment);
        state.calls.push(WireCall::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            fragment: fragment.clone(),
        });
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| !(r.zone_id == zone_id && r.id == record_id));
        if state.records.len() == before {
            return Err(Error::http(404, format!("no record {}", record_id)));
        }
        state.calls.push(WireCall::Delete {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
        });
        Ok(())
    }
}

/// Build a zone from records, failing the test on invalid input
pub fn zone_of(records: Vec<Record>) -> Zone {
    let mut zone = Zone::new(ZONE);
    for record in records {
        zone.add_record(record, false, false).unwrap();
    }
    zone
}

/// Count recorded calls of one kind
pub fn count(calls: &[WireCall], kind: &str) -> usize {
    calls.iter().filter(|c| c.kind() == kind).count()
}
