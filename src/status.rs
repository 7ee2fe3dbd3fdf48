//! The `status` command: liveness of every known service
//!
//! Ping URLs come from the cache store; the services are then pinged one at
//! a time and each live service is printed followed by an `Alive` line.

use crate::cache::CacheStore;
use crate::errors::{CliError, Result};
use crate::manifest::ServiceEndpointMap;
use crate::ping::{LivenessReport, PingClient};
use crate::transport::JsonSource;
use colored::Colorize;
use std::io::Write;
use tracing::{debug, info};

/// Outcome of pinging one service
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceStatus {
    pub service: String,
    pub report: LivenessReport,
}

pub struct StatusCommand<'a, S: JsonSource + ?Sized> {
    source: &'a S,
    cache: CacheStore,
    manifest_url: String,
    force_refresh: bool,
}

impl<'a, S: JsonSource + ?Sized> StatusCommand<'a, S> {
    pub fn new(source: &'a S, cache: CacheStore, manifest_url: impl Into<String>) -> Self {
        Self {
            source,
            cache,
            manifest_url: manifest_url.into(),
            force_refresh: false,
        }
    }

    /// Scrape the manifest even when the cache is fresh
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Ping the requested services (all known ones when empty) and write
    /// the report to `out`. Stops at the first failed ping.
    pub async fn run<W: Write>(&self, requested: &[String], out: &mut W) -> Result<Vec<ServiceStatus>> {
        if self.force_refresh {
            self.cache.clear().await?;
        }
        let endpoints = self.cache.get_or_refresh(self.source, &self.manifest_url).await?;

        let services = select_services(&endpoints, requested)?;
        let client = PingClient::new(self.source);
        let mut statuses = Vec::with_capacity(services.len());

        for service in services {
            let endpoint = &endpoints[&service];
            debug!("Pinging {} at {}", service, endpoint);

            let report = client.ping(endpoint).await?;
            let status = ServiceStatus { service, report };
            render(out, &status)?;
            statuses.push(status);
        }

        Ok(statuses)
    }
}

/// Validate the requested names against the known services.
///
/// An empty request selects every known service in name order. Any unknown
/// name rejects the whole request.
pub fn select_services(endpoints: &ServiceEndpointMap, requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() {
        return Ok(endpoints.keys().cloned().collect());
    }

    let unknown: Vec<String> = requested
        .iter()
        .filter(|name| !endpoints.contains_key(name.as_str()))
        .cloned()
        .collect();

    if !unknown.is_empty() {
        return Err(CliError::Validation {
            unknown,
            known: endpoints.keys().cloned().collect(),
        });
    }

    Ok(requested.to_vec())
}

fn render<W: Write>(out: &mut W, status: &ServiceStatus) -> Result<()> {
    if !status.report.alive {
        info!("{} is not alive (uptime {})", status.service, status.report.uptime);
        return Ok(());
    }

    writeln!(out, "      {}", status.service).map_err(CliError::Output)?;
    writeln!(out, "{}", "      Alive".green()).map_err(CliError::Output)?;
    Ok(())
}
