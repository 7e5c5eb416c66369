//! HTTP implementation of [`PressApi`] for Frappe sites

use async_trait::async_trait;
use press_core::{ErrorContext, PressError, PressResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{create_http_client, handle_response_error, ApiClientConfig, PressApi};

/// Frappe method API client
pub struct FrappeClient {
    client: reqwest::Client,
    config: ApiClientConfig,
}

/// Success envelope of `/api/method/*`
#[derive(Debug, Deserialize)]
struct MethodResponse {
    #[serde(default)]
    message: Value,
}

impl FrappeClient {
    /// Create a new client
    pub fn new(config: ApiClientConfig) -> PressResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| PressError::Config {
            message: format!("Invalid base URL '{}': {}", config.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("frappe_client").with_operation("new"),
        })?;

        let client = create_http_client(&config)?;

        info!("Created Frappe API client for {}", config.base_url);

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for FrappeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrappeClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl PressApi for FrappeClient {
    async fn call_method(&self, method: &str, params: Value) -> PressResult<Value> {
        let url = self.config.method_url(method);

        debug!("Calling {}", url);

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(|e| PressError::Network {
                message: format!("Failed to call {}: {}", method, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("frappe_client")
                    .with_operation("call_method")
                    .with_metadata("method", method)
                    .with_suggestion("Check network connectivity and the site URL"),
            })?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, method).await);
        }

        let body = response.bytes().await.map_err(|e| PressError::Network {
            message: format!("Failed to read response of {}: {}", method, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("frappe_client")
                .with_operation("call_method")
                .with_metadata("method", method),
        })?;

        if body.is_empty() {
            return Ok(Value::Null);
        }

        let envelope: MethodResponse = serde_json::from_slice(&body)?;
        Ok(envelope.message)
    }
}
