// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the management SDK.

use std::time::Duration;

use crate::error::{Result, SdkError};

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

/// Default API version for `Microsoft.MachineLearningServices` resources.
pub const DEFAULT_API_VERSION: &str = "2023-04-01";

/// Configuration for the workspace and flow runtime clients.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Resource Manager endpoint, without trailing slash.
    pub arm_endpoint: String,
    /// `api-version` query parameter sent on every ARM request.
    pub api_version: String,
    /// Flow service endpoint. When unset it is derived from the workspace location.
    pub flow_endpoint: Option<String>,
    /// Resource (audience) tokens are requested for.
    pub token_resource: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay between polls of a long-running operation.
    pub poll_interval: Duration,
    /// Maximum time to wait for a long-running operation to finish.
    pub operation_timeout: Duration,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            flow_endpoint: None,
            token_resource: DEFAULT_ARM_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(60 * 60),
        }
    }
}

impl SdkConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUNTIME_MGMT_ARM_ENDPOINT`: Resource Manager endpoint (default: "https://management.azure.com")
    /// - `RUNTIME_MGMT_ARM_API_VERSION`: ARM api-version (default: "2023-04-01")
    /// - `RUNTIME_MGMT_FLOW_ENDPOINT`: Flow service endpoint (default: derived from workspace location)
    /// - `RUNTIME_MGMT_TOKEN_RESOURCE`: Token audience (default: "https://management.azure.com")
    /// - `RUNTIME_MGMT_REQUEST_TIMEOUT_MS`: Request timeout in milliseconds (default: 30000)
    /// - `RUNTIME_MGMT_POLL_INTERVAL_MS`: Poll interval in milliseconds (default: 5000)
    /// - `RUNTIME_MGMT_OPERATION_TIMEOUT_MS`: Operation timeout in milliseconds (default: 3600000)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let arm_endpoint = var("RUNTIME_MGMT_ARM_ENDPOINT")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.arm_endpoint);

        let api_version = var("RUNTIME_MGMT_ARM_API_VERSION").unwrap_or(defaults.api_version);

        let flow_endpoint = var("RUNTIME_MGMT_FLOW_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string());

        let token_resource = var("RUNTIME_MGMT_TOKEN_RESOURCE").unwrap_or(defaults.token_resource);

        let request_timeout = parse_millis(&var, "RUNTIME_MGMT_REQUEST_TIMEOUT_MS")?
            .unwrap_or(defaults.request_timeout);
        let poll_interval = parse_millis(&var, "RUNTIME_MGMT_POLL_INTERVAL_MS")?
            .unwrap_or(defaults.poll_interval);
        let operation_timeout = parse_millis(&var, "RUNTIME_MGMT_OPERATION_TIMEOUT_MS")?
            .unwrap_or(defaults.operation_timeout);

        Ok(Self {
            arm_endpoint,
            api_version,
            flow_endpoint,
            token_resource,
            request_timeout,
            poll_interval,
            operation_timeout,
        })
    }

    /// Regional flow service endpoint for a workspace location.
    pub fn regional_flow_endpoint(location: &str) -> String {
        format!("https://{}.api.azureml.ms", location)
    }

    /// Set the Resource Manager endpoint.
    pub fn with_arm_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.arm_endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the ARM api-version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the flow service endpoint.
    pub fn with_flow_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.flow_endpoint = Some(endpoint.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the token resource.
    pub fn with_token_resource(mut self, resource: impl Into<String>) -> Self {
        self.token_resource = resource.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the poll interval for long-running operations.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the overall long-running operation timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

fn parse_millis<F>(var: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => {
            let ms: u64 = value
                .trim()
                .parse()
                .map_err(|e| SdkError::Config(format!("invalid {}: {}", key, e)))?;
            Ok(Some(Duration::from_millis(ms)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.arm_endpoint, "https://management.azure.com");
        assert_eq!(config.api_version, "2023-04-01");
        assert!(config.flow_endpoint.is_none());
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = SdkConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.arm_endpoint, DEFAULT_ARM_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.operation_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = SdkConfig::from_vars(vars(&[
            ("RUNTIME_MGMT_ARM_ENDPOINT", "http://localhost:9000/"),
            ("RUNTIME_MGMT_FLOW_ENDPOINT", "http://localhost:9001"),
            ("RUNTIME_MGMT_POLL_INTERVAL_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.arm_endpoint, "http://localhost:9000");
        assert_eq!(config.flow_endpoint.as_deref(), Some("http://localhost:9001"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_from_vars_invalid_number() {
        let err = SdkConfig::from_vars(vars(&[("RUNTIME_MGMT_REQUEST_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("RUNTIME_MGMT_REQUEST_TIMEOUT_MS"));
    }

    #[test]
    fn test_flow_endpoint() {
        assert_eq!(
            SdkConfig::regional_flow_endpoint("eastus"),
            "https://eastus.api.azureml.ms"
        );

        let config = SdkConfig::new().with_flow_endpoint("http://127.0.0.1:8080/");
        assert_eq!(config.flow_endpoint.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_builder_methods() {
        let config = SdkConfig::new()
            .with_arm_endpoint("http://arm.local")
            .with_api_version("2024-01-01-preview")
            .with_token_resource("https://ml.azure.com")
            .with_request_timeout(Duration::from_secs(5))
            .with_poll_interval(Duration::from_millis(10))
            .with_operation_timeout(Duration::from_secs(60));

        assert_eq!(config.arm_endpoint, "http://arm.local");
        assert_eq!(config.api_version, "2024-01-01-preview");
        assert_eq!(config.token_resource, "https://ml.azure.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.operation_timeout, Duration::from_secs(60));
    }
}
