// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client for flow runtimes hosted by the regional flow service.

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::client::WorkspaceClient;
use crate::config::SdkConfig;
use crate::credential::TokenCredential;
use crate::error::{Result, SdkError};
use crate::http::HttpPipeline;
use crate::lro::poll_until;
use crate::types::{DeleteOutcome, FlowRuntimeInfo, RuntimeStatus, WorkspaceScope};

/// Manages named flow runtimes in one workspace.
pub struct FlowRuntimeClient {
    pipeline: HttpPipeline,
    scope: WorkspaceScope,
    endpoint: String,
    config: SdkConfig,
}

impl FlowRuntimeClient {
    /// Create a client talking to `endpoint` (e.g. "https://eastus.api.azureml.ms").
    pub fn new(
        config: SdkConfig,
        credential: Arc<dyn TokenCredential>,
        scope: WorkspaceScope,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let pipeline = HttpPipeline::new(&config, credential)?;
        Ok(Self {
            pipeline,
            scope,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Create a client for the workspace `workspace` is bound to.
    ///
    /// Uses the configured flow endpoint when set. Otherwise the workspace
    /// location is fetched once and the regional endpoint is used.
    pub async fn for_workspace(
        config: SdkConfig,
        credential: Arc<dyn TokenCredential>,
        workspace: &WorkspaceClient,
    ) -> Result<Self> {
        let scope = workspace.scope().clone();
        let endpoint = match &config.flow_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => {
                let info = workspace.get_workspace(&scope.workspace_name).await?;
                SdkConfig::regional_flow_endpoint(&info.location)
            }
        };
        debug!(endpoint = %endpoint, "Resolved flow endpoint");
        Self::new(config, credential, scope, endpoint)
    }

    /// Flow service endpoint in use.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn runtime_url(&self, name: &str) -> String {
        format!(
            "{}/flow/api{}/FlowRuntimes/{}",
            self.endpoint,
            self.scope.resource_path(),
            urlencoding::encode(name)
        )
    }

    /// Get a runtime by name.
    #[instrument(skip(self))]
    pub async fn get_runtime(&self, name: &str) -> Result<FlowRuntimeInfo> {
        let response = self
            .pipeline
            .send_checked(Method::GET, &self.runtime_url(name), &[], None)
            .await?;
        Ok(response.json().await?)
    }

    /// Create a runtime on `ci_name` using `env_asset_id`, waiting until it is ready.
    #[instrument(skip(self))]
    pub async fn create_runtime(
        &self,
        name: &str,
        env_asset_id: &str,
        ci_name: &str,
    ) -> Result<FlowRuntimeInfo> {
        let body = json!({
            "runtimeType": "ComputeInstance",
            "computeInstanceName": ci_name,
            "environment": env_asset_id,
        });

        self.pipeline
            .send_checked(
                Method::POST,
                &self.runtime_url(name),
                &[("asyncCall", "true")],
                Some(&body),
            )
            .await?;

        info!("Waiting for runtime to become ready");
        let runtime = poll_until(
            self.config.poll_interval,
            self.config.operation_timeout,
            move || async move {
                let runtime = self.get_runtime(name).await?;
                if let RuntimeStatus::Unknown(raw) = &runtime.status {
                    warn!(status = %raw, "Unrecognized runtime status, still waiting");
                } else {
                    debug!(status = %runtime.status, "Polled runtime");
                }
                Ok(runtime.status.is_terminal().then_some(runtime))
            },
        )
        .await?;

        if !runtime.status.is_ready() {
            return Err(SdkError::OperationFailed {
                status: runtime.status.to_string(),
                message: runtime
                    .error_message
                    .unwrap_or_else(|| format!("runtime '{}' failed to start", name)),
            });
        }

        info!("Runtime ready");
        Ok(runtime)
    }

    /// Delete a runtime and wait until it is gone.
    ///
    /// A runtime that does not exist is reported as [`DeleteOutcome::NotFound`].
    #[instrument(skip(self))]
    pub async fn delete_runtime(&self, name: &str) -> Result<DeleteOutcome> {
        let result = self
            .pipeline
            .send_checked(
                Method::DELETE,
                &self.runtime_url(name),
                &[("asyncCall", "true")],
                None,
            )
            .await;

        match result {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                warn!("Runtime does not exist, nothing to delete");
                return Ok(DeleteOutcome::NotFound);
            }
            Err(e) => return Err(e),
        }

        info!("Waiting for runtime deletion");
        poll_until(
            self.config.poll_interval,
            self.config.operation_timeout,
            move || async move {
                match self.get_runtime(name).await {
                    Ok(runtime) => {
                        debug!(status = %runtime.status, "Runtime still present");
                        Ok(None)
                    }
                    Err(e) if e.is_not_found() => Ok(Some(())),
                    Err(e) => Err(e),
                }
            },
        )
        .await?;

        info!("Runtime deleted");
        Ok(DeleteOutcome::Deleted)
    }
}
