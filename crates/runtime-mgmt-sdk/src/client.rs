// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! WorkspaceClient for the workspace control plane (Azure Resource Manager).

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use crate::config::SdkConfig;
use crate::credential::{TokenCredential, default_credential};
use crate::definitions::{ComputeInstance, EnvironmentDefinition};
use crate::error::{Result, SdkError};
use crate::http::HttpPipeline;
use crate::lro::{PollTarget, wait_for_operation};
use crate::types::{
    DeleteOutcome, EnvironmentContainerResource, EnvironmentVersion, WorkspaceInfo,
    WorkspaceResource, WorkspaceScope,
};

/// Client bound to a single workspace.
///
/// Create-or-update and delete calls on computes are long-running on the
/// server side; the methods here wait for them to finish before returning.
pub struct WorkspaceClient {
    pipeline: HttpPipeline,
    scope: WorkspaceScope,
    config: SdkConfig,
}

impl WorkspaceClient {
    /// Create a new client with the given configuration and credential.
    pub fn new(
        config: SdkConfig,
        credential: Arc<dyn TokenCredential>,
        scope: WorkspaceScope,
    ) -> Result<Self> {
        for (option, value) in [
            ("subscription id", &scope.subscription_id),
            ("resource group name", &scope.resource_group_name),
            ("workspace name", &scope.workspace_name),
        ] {
            if value.trim().is_empty() {
                return Err(SdkError::Config(format!("{} must not be empty", option)));
            }
        }

        let pipeline = HttpPipeline::new(&config, credential)?;
        Ok(Self {
            pipeline,
            scope,
            config,
        })
    }

    /// Create a client from environment variables and the default credential.
    pub fn from_env(scope: WorkspaceScope) -> Result<Self> {
        Self::new(SdkConfig::from_env()?, default_credential(), scope)
    }

    /// The workspace this client is bound to.
    pub fn scope(&self) -> &WorkspaceScope {
        &self.scope
    }

    /// Get the SDK configuration.
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn workspace_url(&self, workspace_name: &str) -> String {
        format!(
            "{}{}",
            self.config.arm_endpoint,
            self.scope.workspace_path(workspace_name)
        )
    }

    fn child_url(&self, segments: &[&str]) -> String {
        let mut url = self.workspace_url(&self.scope.workspace_name);
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn wait(&self, target: &PollTarget) -> Result<()> {
        wait_for_operation(
            &self.pipeline,
            target,
            self.config.poll_interval,
            self.config.operation_timeout,
        )
        .await
    }

    // =========================================================================
    // Workspaces
    // =========================================================================

    /// Fetch workspace metadata (location, id) by name.
    #[instrument(skip(self))]
    pub async fn get_workspace(&self, name: &str) -> Result<WorkspaceInfo> {
        debug!("Getting workspace");

        let response = self
            .pipeline
            .send_checked(
                Method::GET,
                &self.workspace_url(name),
                &[("api-version", self.config.api_version.as_str())],
                None,
            )
            .await?;
        let workspace: WorkspaceResource = response.json().await?;

        Ok(WorkspaceInfo {
            name: workspace.name,
            location: workspace.location,
            workspace_id: workspace.properties.workspace_id,
        })
    }

    // =========================================================================
    // Compute
    // =========================================================================

    /// Create or update a compute instance and wait until it is provisioned.
    ///
    /// Returns the compute name.
    #[instrument(skip(self, compute), fields(compute = %compute.name))]
    pub async fn create_or_update_compute(&self, compute: &ComputeInstance) -> Result<String> {
        let location = match &compute.location {
            Some(location) => location.clone(),
            None => {
                self.get_workspace(&self.scope.workspace_name)
                    .await?
                    .location
            }
        };

        let body = compute.to_resource_body(&location);
        let response = self
            .pipeline
            .send_checked(
                Method::PUT,
                &self.child_url(&["computes", &compute.name]),
                &[("api-version", self.config.api_version.as_str())],
                Some(&body),
            )
            .await?;

        match PollTarget::from_headers(response.headers()) {
            Some(target) => {
                info!("Waiting for compute provisioning");
                self.wait(&target).await?;
            }
            None => debug!("Compute create returned without an operation to poll"),
        }

        info!("Compute instance ready");
        Ok(compute.name.clone())
    }

    /// Delete a compute instance and its underlying VM, waiting for completion.
    ///
    /// A compute that does not exist is reported as [`DeleteOutcome::NotFound`].
    #[instrument(skip(self))]
    pub async fn delete_compute(&self, name: &str) -> Result<DeleteOutcome> {
        let result = self
            .pipeline
            .send_checked(
                Method::DELETE,
                &self.child_url(&["computes", name]),
                &[
                    ("api-version", self.config.api_version.as_str()),
                    ("underlyingResourceAction", "Delete"),
                ],
                None,
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                warn!("Compute instance does not exist, nothing to delete");
                return Ok(DeleteOutcome::NotFound);
            }
            Err(e) => return Err(e),
        };

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            warn!("Compute instance does not exist, nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        }

        if let Some(target) = PollTarget::from_headers(response.headers()) {
            info!("Waiting for compute deletion");
            self.wait(&target).await?;
        }

        info!("Compute instance deleted");
        Ok(DeleteOutcome::Deleted)
    }

    // =========================================================================
    // Environments
    // =========================================================================

    /// Publish an environment version.
    ///
    /// Definitions without an explicit version get the container's next version.
    #[instrument(skip(self, environment), fields(environment = %environment.name))]
    pub async fn create_or_update_environment(
        &self,
        environment: &EnvironmentDefinition,
    ) -> Result<EnvironmentVersion> {
        let version = match &environment.version {
            Some(version) => version.clone(),
            None => self.next_environment_version(&environment.name).await?,
        };

        let body = environment.to_resource_body();
        self.pipeline
            .send_checked(
                Method::PUT,
                &self.child_url(&["environments", &environment.name, "versions", &version]),
                &[("api-version", self.config.api_version.as_str())],
                Some(&body),
            )
            .await?;

        info!(version = %version, "Environment published");
        Ok(EnvironmentVersion::new(environment.name.clone(), version))
    }

    /// Version the next publish of `name` should use.
    #[instrument(skip(self))]
    pub async fn next_environment_version(&self, name: &str) -> Result<String> {
        let result = self
            .pipeline
            .send_checked(
                Method::GET,
                &self.child_url(&["environments", name]),
                &[("api-version", self.config.api_version.as_str())],
                None,
            )
            .await;

        let container: EnvironmentContainerResource = match result {
            Ok(response) => response.json().await?,
            Err(e) if e.is_not_found() => {
                debug!("Environment container does not exist yet");
                return Ok("1".to_string());
            }
            Err(e) => return Err(e),
        };

        let properties = container.properties;
        if let Some(next) = properties.next_version {
            return Ok(next);
        }
        match properties.latest_version {
            Some(latest) => latest
                .parse::<u64>()
                .map(|n| (n + 1).to_string())
                .map_err(|_| {
                    SdkError::InvalidInput(format!(
                        "environment '{}' has non-numeric latest version '{}'; set 'version' explicitly",
                        name, latest
                    ))
                }),
            None => Ok("1".to_string()),
        }
    }
}
