// # Cloudflare API transport
//
// `CloudflareApi` is the seam between the reconciliation logic and the
// network. `HttpClient` implements it on top of reqwest; tests substitute an
// in-memory fake.
//
// ## API Reference
//
// - List zones: GET `/zones?page=N`
// - Create zone: POST `/zones`
// - List records: GET `/zones/:zone_id/dns_records?page=N`
// - Create record: POST `/zones/:zone_id/dns_records`
// - Update record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete record: DELETE `/zones/:zone_id/dns_records/:record_id`
//
// ## Security
//
// Credentials never appear in logs or in `Debug` output.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};
use zonesync_core::{Error, Result};

use crate::wire::{Page, WireFragment, WireRecord, ZoneSummary};

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Placeholder id returned by zone creation in dry-run mode
pub const DRY_RUN_ZONE_ID: &str = "dry-run";

/// The remote operations the provider needs
///
/// Every call is a single request. Nothing here retries.
#[async_trait]
pub trait CloudflareApi: Send + Sync {
    /// One page of the account's zones (pages start at 1)
    async fn list_zones(&self, page: u32) -> Result<Page<ZoneSummary>>;

    /// One page of a zone's records (pages start at 1)
    async fn list_records(&self, zone_id: &str, page: u32) -> Result<Page<WireRecord>>;

    /// Create a zone, returning its id
    ///
    /// `name` has no trailing dot.
    async fn create_zone(&self, name: &str) -> Result<String>;

    async fn create_record(&self, zone_id: &str, fragment: &WireFragment) -> Result<()>;

    async fn update_record(&self, zone_id: &str, record_id: &str, fragment: &WireFragment)
        -> Result<()>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;
}

/// API credentials
#[derive(Clone)]
pub enum Credentials {
    /// Scoped API token, sent as a bearer token
    Token(String),
    /// Account email plus global API key
    GlobalKey { email: String, key: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<REDACTED>").finish(),
            Credentials::GlobalKey { email, .. } => f
                .debug_struct("GlobalKey")
                .field("email", email)
                .field("key", &"<REDACTED>")
                .finish(),
        }
    }
}

impl Credentials {
    /// Build credentials from an optional email and a token or key
    pub fn new(email: Option<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        Ok(match email {
            Some(email) => Credentials::GlobalKey { email, key: token },
            None => Credentials::Token(token),
        })
    }
}

/// reqwest-backed [`CloudflareApi`]
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, listing requests are still sent but mutating
/// requests are only logged. Zone creation returns [`DRY_RUN_ZONE_ID`].
pub struct HttpClient {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    dry_run: bool,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl HttpClient {
    /// Create a client for the public Cloudflare API
    pub fn new(credentials: Credentials, dry_run: bool) -> Result<Self> {
        Self::with_base_url(credentials, CLOUDFLARE_API_BASE, dry_run)
    }

    /// Create a client against another base URL
    pub fn with_base_url(
        credentials: Credentials,
        base_url: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        if dry_run {
            warn!("Cloudflare client running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            client,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dry_run,
        })
    }

    /// Whether mutating calls are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send one request and return the decoded JSON body
    async fn request(
        &self,
        method: Method,
        path: &str,
        page: Option<u32>,
        body: Option<Value>,
    ) -> Result<Value> {
        debug!("request: method={}, path={}", method, path);

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json");

        builder = match &self.credentials {
            Credentials::Token(token) => builder.bearer_auth(token),
            Credentials::GlobalKey { email, key } => builder
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        };
        if let Some(page) = page {
            builder = builder.query(&[("page", page)]);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        debug!("request:   status={}", status);

        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        if status == 403 {
            return Err(Error::auth(authentication_message(&text)));
        }
        if status > 299 {
            warn!("request: status={}, body={}", status, text);
            return Err(Error::http(status, text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: u32) -> Result<Page<T>> {
        let body = self.request(Method::GET, path, Some(page), None).await?;
        parse_page(body)
    }

    fn dry_run_log(&self, method: &Method, path: &str, body: Option<&Value>) {
        match body {
            Some(body) => info!("[DRY-RUN] Would send {} {} with payload: {}", method, path, body),
            None => info!("[DRY-RUN] Would send {} {}", method, path),
        }
    }
}

#[async_trait]
impl CloudflareApi for HttpClient {
    async fn list_zones(&self, page: u32) -> Result<Page<ZoneSummary>> {
        self.get_page("/zones", page).await
    }

    async fn list_records(&self, zone_id: &str, page: u32) -> Result<Page<WireRecord>> {
        self.get_page(&format!("/zones/{}/dns_records", zone_id), page)
            .await
    }

    async fn create_zone(&self, name: &str) -> Result<String> {
        let body = json!({ "name": name, "jump_start": false });

        if self.dry_run {
            self.dry_run_log(&Method::POST, "/zones", Some(&body));
            return Ok(DRY_RUN_ZONE_ID.to_string());
        }

        let resp = self
            .request(Method::POST, "/zones", None, Some(body))
            .await?;
        resp["result"]["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                Error::provider("cloudflare", "Invalid response format: result.id is not a string")
            })
    }

    async fn create_record(&self, zone_id: &str, fragment: &WireFragment) -> Result<()> {
        let path = format!("/zones/{}/dns_records", zone_id);
        let body = serde_json::to_value(fragment)?;

        if self.dry_run {
            self.dry_run_log(&Method::POST, &path, Some(&body));
            return Ok(());
        }

        self.request(Method::POST, &path, None, Some(body)).await?;
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        fragment: &WireFragment,
    ) -> Result<()> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);
        let body = serde_json::to_value(fragment)?;

        if self.dry_run {
            self.dry_run_log(&Method::PUT, &path, Some(&body));
            return Ok(());
        }

        self.request(Method::PUT, &path, None, Some(body)).await?;
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);

        if self.dry_run {
            self.dry_run_log(&Method::DELETE, &path, None);
            return Ok(());
        }

        self.request(Method::DELETE, &path, None, None).await?;
        Ok(())
    }
}

/// Extract the service-reported message from a 403 body
fn authentication_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["errors"][0]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| "Authentication error".to_string())
}

/// Decode a listing response: `result` plus `result_info.{count,per_page}`
fn parse_page<T: DeserializeOwned>(mut body: Value) -> Result<Page<T>> {
    let info = &body["result_info"];
    let count = info["count"].as_u64().ok_or_else(|| {
        Error::provider("cloudflare", "Invalid response format: result_info.count missing")
    })? as usize;
    let per_page = info["per_page"].as_u64().ok_or_else(|| {
        Error::provider("cloudflare", "Invalid response format: result_info.per_page missing")
    })? as usize;

    let items: Vec<T> = serde_json::from_value(body["result"].take())?;

    Ok(Page {
        items,
        count,
        per_page,
    })
}
