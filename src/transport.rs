//! HTTP transport layer for fetching JSON documents

use crate::errors::{CliError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Source of JSON documents addressed by URL
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// GET a document; anything other than 200 is an error
    async fn get_json(&self, url: &str) -> Result<Value>;

    /// POST a JSON body and return the JSON response
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;
}

/// Fetch a document and decode it into `T`
pub async fn fetch<T, S>(source: &S, url: &str) -> Result<T>
where
    T: DeserializeOwned,
    S: JsonSource + ?Sized,
{
    let value = source.get_json(url).await?;
    decode(url, value)
}

/// Decode an already fetched document, naming its URL on failure
pub fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| CliError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Unauthenticated HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(http_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(format!("cluster-cli/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = http_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(CliError::Network)?;

        Ok(Self { client })
    }

    /// Check the status and decode the body of a response
    async fn handle_response(&self, response: Response, url: &str) -> Result<Value> {
        let status = response.status();

        if status != StatusCode::OK {
            return Err(CliError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(CliError::Network)?;
        debug!("Received {} bytes from {}", body.len(), url);

        serde_json::from_slice(&body).map_err(|source| CliError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl JsonSource for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(CliError::Network)?;

        self.handle_response(response, url).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(CliError::Network)?;

        self.handle_response(response, url).await
    }
}
