//! The `expand-scope` command

use crate::errors::Result;
use crate::transport::{JsonSource, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request and response body of the scope expansion endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ScopeSet {
    pub scopes: Vec<String>,
}

pub struct ScopeExpander<'a, S: JsonSource + ?Sized> {
    source: &'a S,
    auth_url: String,
}

impl<'a, S: JsonSource + ?Sized> ScopeExpander<'a, S> {
    pub fn new(source: &'a S, auth_url: impl Into<String>) -> Self {
        Self {
            source,
            auth_url: auth_url.into(),
        }
    }

    /// Expand `scopes`, including those implied by any roles they carry
    pub async fn expand(&self, scopes: &[String]) -> Result<Vec<String>> {
        let url = format!("{}/scopes/expand", self.auth_url);
        let body = serde_json::to_value(ScopeSet {
            scopes: scopes.to_vec(),
        })?;

        debug!("Expanding {} scope(s)", scopes.len());
        let response = self.source.post_json(&url, &body).await?;
        let expanded: ScopeSet = decode(&url, response)?;

        Ok(expanded.scopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CliError;
    use crate::transport::HttpTransport;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_expand_posts_scope_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scopes/expand"))
            .and(body_json(json!({"scopes": ["assume:project:ci"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "scopes": ["assume:project:ci", "queue:create-task:ci"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let expander = ScopeExpander::new(&transport, format!("{}/v1", server.uri()));
        let scopes = expander
            .expand(&["assume:project:ci".to_string()])
            .await
            .unwrap();

        assert_eq!(scopes, vec!["assume:project:ci", "queue:create-task:ci"]);
    }

    #[tokio::test]
    async fn test_expand_rejected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let expander = ScopeExpander::new(&transport, format!("{}/v1", server.uri()));
        let result = expander.expand(&["x".to_string()]).await;

        assert!(matches!(result, Err(CliError::HttpStatus { status: 400, .. })));
    }
}
