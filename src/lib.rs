//! Cluster command line tool library
//!
//! Reports the liveness of the cluster's services from cached ping
//! endpoints and expands permission scopes through the auth service.

pub mod cache;
pub mod config;
pub mod errors;
pub mod expand_scope;
pub mod manifest;
pub mod ping;
pub mod status;
pub mod transport;

pub use cache::{CacheRecord, CacheStore};
pub use config::Config;
pub use errors::{CliError, Result};
pub use expand_scope::ScopeExpander;
pub use manifest::{EndpointResolver, ServiceEndpointMap};
pub use ping::{LivenessReport, PingClient};
pub use status::{ServiceStatus, StatusCommand};
pub use transport::{HttpTransport, JsonSource};
