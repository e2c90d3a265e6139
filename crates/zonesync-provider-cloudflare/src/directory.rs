//! Zone and record directory
//!
//! Lists the account's zones and each zone's records through a
//! [`CloudflareApi`], following pagination until a short page. Results are
//! cached: zones for the life of the directory, records per zone name until
//! the provisioner invalidates them after an apply.
//!
//! Zone names used as keys always carry a trailing dot.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;
use zonesync_core::Result;

use crate::client::CloudflareApi;
use crate::wire::{Page, WireRecord};

/// Cached view of the remote zones and their records
pub struct ZoneDirectory {
    api: Arc<dyn CloudflareApi>,
    zones: Mutex<Option<HashMap<String, String>>>,
    records: Mutex<HashMap<String, Vec<WireRecord>>>,
}

impl ZoneDirectory {
    pub fn new(api: Arc<dyn CloudflareApi>) -> Self {
        Self {
            api,
            zones: Mutex::new(None),
            records: Mutex::new(HashMap::new()),
        }
    }

    /// The transport used for listing
    pub fn api(&self) -> &Arc<dyn CloudflareApi> {
        &self.api
    }

    /// Map of zone name (with trailing dot) to zone id
    pub async fn zones(&self) -> Result<HashMap<String, String>> {
        let mut zones = self.zones.lock().await;
        if let Some(zones) = zones.as_ref() {
            return Ok(zones.clone());
        }

        let api = self.api.as_ref();
        let listed = fetch_all(move |page| api.list_zones(page)).await?;
        let map: HashMap<String, String> = listed
            .into_iter()
            .map(|z| (zone_key(&z.name), z.id))
            .collect();
        debug!("zones: found {} zone(s)", map.len());

        *zones = Some(map.clone());
        Ok(map)
    }

    /// Id of the named zone, if it exists
    pub async fn zone_id(&self, zone_name: &str) -> Result<Option<String>> {
        Ok(self.zones().await?.get(&zone_key(zone_name)).cloned())
    }

    /// Every record currently listed for the named zone
    ///
    /// A zone that does not exist has no records; that is not an error.
    pub async fn records(&self, zone_name: &str) -> Result<Vec<WireRecord>> {
        let key = zone_key(zone_name);
        let mut records = self.records.lock().await;
        if let Some(cached) = records.get(&key) {
            return Ok(cached.clone());
        }

        let Some(zone_id) = self.zone_id(&key).await? else {
            return Ok(Vec::new());
        };

        let api = self.api.as_ref();
        let zone_id = zone_id.as_str();
        let listed = fetch_all(move |page| api.list_records(zone_id, page)).await?;
        debug!("records: zone={}, found {} record(s)", key, listed.len());

        records.insert(key, listed.clone());
        Ok(listed)
    }

    /// Record a newly created zone and seed its (empty) record cache
    pub async fn insert_zone(&self, zone_name: &str, zone_id: &str) {
        let key = zone_key(zone_name);
        if let Some(zones) = self.zones.lock().await.as_mut() {
            zones.insert(key.clone(), zone_id.to_string());
        }
        self.records.lock().await.insert(key, Vec::new());
    }

    /// Drop the cached records of a zone so the next read lists it again
    pub async fn invalidate(&self, zone_name: &str) {
        self.records.lock().await.remove(&zone_key(zone_name));
    }
}

/// Cache key for a zone: lowercase with a trailing dot
fn zone_key(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.').to_ascii_lowercase())
}

/// Request pages starting at 1 while the previous page was full
async fn fetch_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let current = fetch(page).await?;
        let more = current.has_more();
        items.extend(current.items);
        if !more {
            return Ok(items);
        }
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_key_normalizes_case_and_dot() {
        assert_eq!(zone_key("Example.COM"), "example.com.");
        assert_eq!(zone_key("example.com."), "example.com.");
    }

    #[tokio::test]
    async fn test_fetch_all_stops_on_short_page() {
        let pages = vec![vec![1, 2], vec![3, 4], vec![5]];
        let mut requested = Vec::new();

        let items = fetch_all(|page: u32| {
            requested.push(page);
            let items = pages[page as usize - 1].clone();
            async move {
                Ok(Page {
                    count: items.len(),
                    per_page: 2,
                    items,
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_exact_multiple_requests_empty_page() {
        let pages = vec![vec![1, 2], vec![]];
        let mut requested = 0;

        let items = fetch_all(|page: u32| {
            requested += 1;
            let items: Vec<i32> = pages[page as usize - 1].clone();
            async move {
                Ok(Page {
                    count: items.len(),
                    per_page: 2,
                    items,
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2]);
        assert_eq!(requested, 2);
    }
}
