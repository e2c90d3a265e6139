// # File Source
//
// Reads desired zone state from JSON zone files.
//
// ## File Layout
//
// One file per zone, named after the zone without its trailing dot:
// `<directory>/example.com.json`.
//
// ## File Format
//
// ```json
// {
//   "records": [
//     { "name": "",    "ttl": 300, "type": "A",     "value": ["1.2.3.4", "5.6.7.8"] },
//     { "name": "www", "ttl": 300, "type": "CNAME", "value": "example.com." },
//     { "name": "",    "type": "MX", "value": [{ "preference": 10, "exchange": "mx.example.com." }] }
//   ]
// }
// ```
//
// `ttl` defaults to 3600. Multi-value types accept a bare value in place of a
// one-element array.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::record::{Record, RecordData, RecordType};
use crate::traits::{Source, SourceFactory};
use crate::zone::Zone;

/// TTL used when a zone file entry omits one
const DEFAULT_TTL: u32 = 3600;

/// Serializable zone file format
#[derive(Debug, Deserialize)]
struct ZoneFile {
    #[serde(default)]
    records: Vec<ZoneFileEntry>,
}

#[derive(Debug, Deserialize)]
struct ZoneFileEntry {
    #[serde(default)]
    name: String,
    #[serde(default = "default_ttl")]
    ttl: u32,
    #[serde(rename = "type")]
    record_type: RecordType,
    value: serde_json::Value,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// Source backed by a directory of JSON zone files
#[derive(Debug, Clone)]
pub struct FileSource {
    directory: PathBuf,
}

impl FileSource {
    /// Create a source reading from `directory`
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Path of the zone file for `zone_name`
    pub fn zone_path(&self, zone_name: &str) -> PathBuf {
        self.directory
            .join(format!("{}.json", zone_name.trim_end_matches('.')))
    }
}

#[async_trait]
impl Source for FileSource {
    fn id(&self) -> &str {
        "file"
    }

    fn supports(&self, _record_type: RecordType) -> bool {
        true
    }

    async fn populate(&self, zone: &mut Zone, target: bool, lenient: bool) -> Result<bool> {
        let path = self.zone_path(zone.name());
        debug!(
            "populate: name={}, target={}, lenient={}, path={}",
            zone.name(),
            target,
            lenient,
            path.display()
        );

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("populate: no zone file for {} at {}", zone.name(), path.display());
                return Ok(false);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let file: ZoneFile = serde_json::from_str(&contents).map_err(|e| {
            Error::config(format!("Failed to parse zone file {}: {}", path.display(), e))
        })?;

        let before = zone.len();
        for entry in file.records {
            let data = RecordData::from_json(entry.record_type, entry.value)?;
            let record = Record::new(zone.name(), entry.name, entry.ttl, data);
            zone.add_record(record, false, lenient)?;
        }

        info!("populate: found {} records", zone.len() - before);
        Ok(true)
    }
}

/// Factory for creating file sources
pub struct FileSourceFactory;

impl SourceFactory for FileSourceFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn Source>> {
        match config {
            SourceConfig::File { directory } => {
                if directory.is_empty() {
                    return Err(Error::config("Zone file directory is required"));
                }
                Ok(Box::new(FileSource::new(directory)))
            }
            _ => Err(Error::config("Invalid config for file source")),
        }
    }
}
