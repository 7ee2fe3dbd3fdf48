//! Liveness checks against service ping endpoints

use crate::errors::Result;
use crate::transport::{JsonSource, fetch};
use serde::{Deserialize, Serialize};

/// Body returned by a service ping endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LivenessReport {
    pub alive: bool,
    pub uptime: f64,
}

pub struct PingClient<'a, S: JsonSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: JsonSource + ?Sized> PingClient<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Query a ping endpoint. A non-200 answer is an error, not a dead service.
    pub async fn ping(&self, endpoint: &str) -> Result<LivenessReport> {
        fetch(self.source, endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CliError;
    use crate::transport::HttpTransport;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ping_reports_liveness() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"alive": true, "uptime": 12.5})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let report = PingClient::new(&transport)
            .ping(&format!("{}/v1/ping", server.uri()))
            .await
            .unwrap();

        assert_eq!(report, LivenessReport { alive: true, uptime: 12.5 });
    }

    #[tokio::test]
    async fn test_not_alive_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"alive": false, "uptime": 0})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let report = PingClient::new(&transport)
            .ping(&format!("{}/v1/ping", server.uri()))
            .await
            .unwrap();

        assert!(!report.alive);
        assert_eq!(report.uptime, 0.0);
    }

    #[tokio::test]
    async fn test_server_error_is_hard_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let result = PingClient::new(&transport)
            .ping(&format!("{}/v1/ping", server.uri()))
            .await;

        assert!(matches!(result, Err(CliError::HttpStatus { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_missing_field_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uptime": 3})))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let result = PingClient::new(&transport)
            .ping(&format!("{}/v1/ping", server.uri()))
            .await;

        assert!(matches!(result, Err(CliError::Decode { .. })));
    }
}
