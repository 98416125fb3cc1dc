// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Collaborator trait definitions.
//!
//! The lifecycle workflow only sees these traits, so it can run against the
//! real clients or against in-memory mocks.

use async_trait::async_trait;

use crate::client::WorkspaceClient;
use crate::definitions::{ComputeInstance, EnvironmentDefinition};
use crate::error::Result;
use crate::runtime::FlowRuntimeClient;
use crate::types::{DeleteOutcome, EnvironmentVersion, WorkspaceInfo, WorkspaceScope};

/// Workspace control-plane operations.
///
/// Every method blocks until the control plane reports completion or failure.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Workspace coordinates the client is bound to.
    fn scope(&self) -> &WorkspaceScope;

    /// Create or update a compute instance; returns its name once provisioned.
    async fn create_or_update_compute(&self, compute: &ComputeInstance) -> Result<String>;

    /// Delete a compute instance by name.
    async fn delete_compute(&self, name: &str) -> Result<DeleteOutcome>;

    /// Publish an environment; returns the name and version created.
    async fn create_or_update_environment(
        &self,
        environment: &EnvironmentDefinition,
    ) -> Result<EnvironmentVersion>;

    /// Fetch workspace metadata by name.
    async fn get_workspace(&self, name: &str) -> Result<WorkspaceInfo>;
}

/// Runtime management operations.
#[async_trait]
pub trait RuntimeHelper: Send + Sync {
    /// Delete the named runtime.
    async fn delete_runtime(&self, name: &str) -> Result<DeleteOutcome>;

    /// Create the named runtime bound to an environment asset and a compute instance.
    async fn create_runtime(&self, name: &str, env_asset_id: &str, ci_name: &str) -> Result<()>;
}

#[async_trait]
impl ControlPlane for WorkspaceClient {
    fn scope(&self) -> &WorkspaceScope {
        WorkspaceClient::scope(self)
    }

    async fn create_or_update_compute(&self, compute: &ComputeInstance) -> Result<String> {
        WorkspaceClient::create_or_update_compute(self, compute).await
    }

    async fn delete_compute(&self, name: &str) -> Result<DeleteOutcome> {
        WorkspaceClient::delete_compute(self, name).await
    }

    async fn create_or_update_environment(
        &self,
        environment: &EnvironmentDefinition,
    ) -> Result<EnvironmentVersion> {
        WorkspaceClient::create_or_update_environment(self, environment).await
    }

    async fn get_workspace(&self, name: &str) -> Result<WorkspaceInfo> {
        WorkspaceClient::get_workspace(self, name).await
    }
}

#[async_trait]
impl RuntimeHelper for FlowRuntimeClient {
    async fn delete_runtime(&self, name: &str) -> Result<DeleteOutcome> {
        FlowRuntimeClient::delete_runtime(self, name).await
    }

    async fn create_runtime(&self, name: &str, env_asset_id: &str, ci_name: &str) -> Result<()> {
        FlowRuntimeClient::create_runtime(self, name, env_asset_id, ci_name)
            .await
            .map(|_| ())
    }
}
