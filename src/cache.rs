//! On-disk cache of resolved ping URLs
//!
//! The whole endpoint map is stored with a single retrieval timestamp and
//! replaced wholesale once it is older than the configured maximum age.

use crate::errors::{CliError, Result};
use crate::manifest::{EndpointResolver, ServiceEndpointMap};
use crate::transport::JsonSource;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Persisted form of the endpoint map
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "pingURLs")]
    pub ping_urls: ServiceEndpointMap,
}

impl CacheRecord {
    /// True once more than `max_age` has passed since `last_updated`
    pub fn is_stale(&self, max_age: TimeDelta, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_updated) > max_age
    }
}

/// Reads, writes and refreshes the cache file at a fixed path
pub struct CacheStore {
    path: PathBuf,
    max_age: TimeDelta,
    clock: Clock,
}

impl CacheStore {
    pub fn new(path: PathBuf, max_age: std::time::Duration) -> Result<Self> {
        Self::with_clock(path, max_age, system_clock())
    }

    pub fn with_clock(path: PathBuf, max_age: std::time::Duration, clock: Clock) -> Result<Self> {
        let max_age = TimeDelta::from_std(max_age)
            .map_err(|e| CliError::Config(format!("cache max age out of range: {}", e)))?;

        Ok(Self { path, max_age, clock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache record from disk
    pub async fn load(&self) -> Result<CacheRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CliError::CacheMissing(self.path.clone()));
            }
            Err(e) => return Err(CliError::Io(e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| CliError::Decode {
            url: self.path.display().to_string(),
            source,
        })
    }

    pub fn is_stale(&self, record: &CacheRecord) -> bool {
        record.is_stale(self.max_age, (self.clock)())
    }

    /// Stamp `ping_urls` with the current time and write it out, replacing
    /// any previous record
    pub async fn persist(&self, ping_urls: ServiceEndpointMap) -> Result<CacheRecord> {
        info!("Writing cache file {}", self.path.display());

        let record = CacheRecord {
            last_updated: (self.clock)(),
            ping_urls,
        };
        let bytes = serde_json::to_vec_pretty(&record).map_err(CliError::Encode)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write beside the target so the rename stays on one filesystem
        let staging = self.path.with_extension("json.tmp");
        let written = match tokio::fs::write(&staging, &bytes).await {
            Ok(()) => tokio::fs::rename(&staging, &self.path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                debug!("Could not remove {}: {}", staging.display(), cleanup);
            }
            return Err(CliError::Io(e));
        }

        Ok(record)
    }

    /// Remove the cache file; a missing file is not an error
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed cache file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CliError::Io(e)),
        }
    }

    /// Return the cached endpoint map, scraping the manifest again when the
    /// cache is absent, stale or unreadable
    pub async fn get_or_refresh<S>(&self, source: &S, manifest_url: &str) -> Result<ServiceEndpointMap>
    where
        S: JsonSource + ?Sized,
    {
        match self.load().await {
            Ok(record) if !self.is_stale(&record) => {
                debug!(
                    "Using cached ping URLs from {} (updated {})",
                    self.path.display(),
                    record.last_updated.to_rfc3339()
                );
                return Ok(record.ping_urls);
            }
            Ok(record) => {
                info!(
                    "Cached ping URLs last updated {} are stale",
                    record.last_updated.to_rfc3339()
                );
            }
            Err(CliError::CacheMissing(_)) => {
                debug!("No cache file at {}", self.path.display());
            }
            Err(e) => {
                warn!("Ignoring unreadable cache file: {}", e);
            }
        }

        self.refresh(source, manifest_url).await
    }

    /// Scrape the manifest and overwrite the cache with the result
    pub async fn refresh<S>(&self, source: &S, manifest_url: &str) -> Result<ServiceEndpointMap>
    where
        S: JsonSource + ?Sized,
    {
        let ping_urls = EndpointResolver::new(source).resolve(manifest_url).await?;
        let record = self.persist(ping_urls).await?;
        Ok(record.ping_urls)
    }
}
