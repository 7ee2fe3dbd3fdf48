//! Discovery of service ping endpoints from the API reference manifest
//!
//! The manifest maps each service to the URL of its API reference. Every
//! reference carries the service base URL and a list of named entries; the
//! entry called `ping` gives the route of the liveness check.

use crate::errors::{CliError, Result};
use crate::transport::{JsonSource, fetch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Service name (e.g. `queue`) to the URL of its ping endpoint
pub type ServiceEndpointMap = BTreeMap<String, String>;

/// Service name to the URL of its API reference
pub type ManifestDocument = BTreeMap<String, String>;

const PING_ENTRY: &str = "ping";

/// Subset of an API reference needed to locate the ping endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiDescription {
    pub base_url: String,
    #[serde(default)]
    pub entries: Vec<ApiEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiEntry {
    pub name: String,
    pub route: String,
}

impl ApiDescription {
    /// First entry named `ping`, if the service exposes one
    pub fn ping_entry(&self) -> Option<&ApiEntry> {
        self.entries.iter().find(|entry| entry.name == PING_ENTRY)
    }

    /// Service name taken from the first label of the base URL's host
    pub fn service_name(&self) -> Result<String> {
        let base = url::Url::parse(&self.base_url)?;
        let host = base
            .host_str()
            .ok_or_else(|| CliError::UrlParse(format!("no host in {}", self.base_url)))?;

        Ok(host.split('.').next().unwrap_or(host).to_string())
    }

    /// Service name and ping URL, or `None` when there is no ping entry
    pub fn ping_endpoint(&self) -> Result<Option<(String, String)>> {
        let Some(entry) = self.ping_entry() else {
            return Ok(None);
        };

        let service = self.service_name()?;
        Ok(Some((service, format!("{}{}", self.base_url, entry.route))))
    }
}

/// Walks the manifest and every API reference it lists
pub struct EndpointResolver<'a, S: JsonSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: JsonSource + ?Sized> EndpointResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve the ping URL of every service in the manifest.
    ///
    /// Any failed fetch or decode aborts the walk; services without a ping
    /// entry are left out.
    pub async fn resolve(&self, manifest_url: &str) -> Result<ServiceEndpointMap> {
        info!("Scraping ping URLs from {}", manifest_url);

        let manifest: ManifestDocument = fetch(self.source, manifest_url).await?;
        let mut endpoints = ServiceEndpointMap::new();

        for (listed_as, reference_url) in &manifest {
            let reference: ApiDescription = fetch(self.source, reference_url).await?;

            match reference.ping_endpoint()? {
                Some((service, ping_url)) => {
                    debug!("Service {} (listed as {}) pings at {}", service, listed_as, ping_url);
                    endpoints.insert(service, ping_url);
                }
                None => {
                    debug!("No ping entry in API reference {}", reference_url);
                }
            }
        }

        Ok(endpoints)
    }
}
