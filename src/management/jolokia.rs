//! Jolokia HTTP Client
//!
//! Talks to a Jolokia agent running inside the application server,
//! using the JSON-over-HTTP `search` and `read` operations to
//! enumerate MBeans and read their attributes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ManagementClient, ResourceIdentity};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Jolokia client
#[derive(Debug, Clone)]
pub struct JolokiaConfig {
    /// Jolokia agent base URL
    pub base_url: String,

    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for JolokiaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8778/jolokia".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Jolokia Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct JolokiaResponse {
    status: u16,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// Jolokia Client
// =============================================================================

/// HTTP client for a Jolokia management agent
pub struct JolokiaClient {
    config: JolokiaConfig,
    client: Client,
    healthy: RwLock<bool>,
}

impl JolokiaClient {
    /// Create a new Jolokia client
    pub fn new(config: JolokiaConfig) -> Result<Arc<Self>> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Arc::new(Self {
            config,
            client,
            healthy: RwLock::new(true),
        }))
    }

    /// Check if the management endpoint is reachable
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<()> {
        let response = self.execute(&json!({ "type": "version" })).await?;

        if response.status == 200 {
            Ok(())
        } else {
            Err(Error::ResponseParse(format!(
                "Version probe returned status {}",
                response.status
            )))
        }
    }

    /// Check if the client is healthy
    pub fn is_healthy(&self) -> bool {
        *self.healthy.read()
    }

    /// Execute one Jolokia POST request
    async fn execute(&self, body: &serde_json::Value) -> Result<JolokiaResponse> {
        let response = self
            .client
            .post(&self.config.base_url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                *self.healthy.write() = false;
                Error::ManagementConnection(e)
            })?;

        if !response.status().is_success() {
            *self.healthy.write() = false;
            return Err(Error::ResponseParse(format!(
                "Management endpoint returned HTTP {}",
                response.status()
            )));
        }

        let parsed: JolokiaResponse = response
            .json()
            .await
            .map_err(|e| Error::ResponseParse(e.to_string()))?;

        *self.healthy.write() = true;
        Ok(parsed)
    }
}

impl std::fmt::Debug for JolokiaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JolokiaClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl ManagementClient for JolokiaClient {
    #[instrument(skip(self))]
    async fn query_resources(&self, pattern: &str) -> Result<Vec<ResourceIdentity>> {
        let body = json!({ "type": "search", "mbean": pattern });
        let response = self.execute(&body).await?;

        if response.status != 200 {
            return Err(Error::Discovery(format!(
                "search for '{}' failed: {}",
                pattern,
                response
                    .error
                    .unwrap_or_else(|| format!("status {}", response.status))
            )));
        }

        let names = match response.value {
            Some(serde_json::Value::Array(names)) => names,
            _ => {
                return Err(Error::Discovery(format!(
                    "search for '{}' returned no result list",
                    pattern
                )))
            }
        };

        let mut resources = Vec::with_capacity(names.len());
        for name in &names {
            let name = name.as_str().ok_or_else(|| {
                Error::ResponseParse("non-string object name in search result".to_string())
            })?;
            resources.push(ResourceIdentity::parse(name)?);
        }

        debug!(
            "Search for '{}' matched {} resources",
            pattern,
            resources.len()
        );
        Ok(resources)
    }

    #[instrument(skip(self, resource), fields(resource = %resource))]
    async fn read_attribute(&self, resource: &ResourceIdentity, attribute: &str) -> Result<f64> {
        let body = json!({
            "type": "read",
            "mbean": resource.object_name(),
            "attribute": attribute,
        });
        let response = self.execute(&body).await?;

        if response.status != 200 {
            return Err(Error::AttributeRead {
                resource: resource.object_name().to_string(),
                attribute: attribute.to_string(),
                reason: response
                    .error
                    .unwrap_or_else(|| format!("status {}", response.status)),
            });
        }

        response
            .value
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| Error::AttributeRead {
                resource: resource.object_name().to_string(),
                attribute: attribute.to_string(),
                reason: "value is not numeric".to_string(),
            })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_config() -> JolokiaConfig {
        JolokiaConfig {
            // Non-existent port, connections are refused immediately
            base_url: "http://localhost:19999/jolokia".to_string(),
            request_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_default_config() {
        let config = JolokiaConfig::default();
        assert_eq!(config.base_url, "http://localhost:8778/jolokia");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_connection_refused_on_search() {
        let client = JolokiaClient::new(test_config()).unwrap();

        let result = client.query_resources("test:name=*,manager=*").await;
        assert_matches!(result, Err(Error::ManagementConnection(_)));

        // Failed round-trips mark the client unhealthy
        assert!(!client.is_healthy());
    }

    #[tokio::test]
    async fn test_connection_refused_on_attribute_read() {
        let client = JolokiaClient::new(test_config()).unwrap();
        let identity = ResourceIdentity::parse("test:name=cache,manager=mgr").unwrap();

        let result = client.read_attribute(&identity, "hits").await;
        assert_matches!(result, Err(Error::ManagementConnection(_)));
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let client = JolokiaClient::new(test_config()).unwrap();

        let result = client.health_check().await;
        assert!(result.is_err());
        assert!(!client.is_healthy());
    }
}
