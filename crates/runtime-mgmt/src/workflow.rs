// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runtime lifecycle workflow.
//!
//! Tears down the runtime and its compute instance, then rebuilds the compute
//! instance, the environment and the runtime, in that order:
//!
//! ```text
//! Start -> RuntimeDeleted -> ComputeDeleted -> ComputeCreated -> EnvironmentCreated -> RuntimeCreated
//! ```
//!
//! Any failure halts the run. Nothing already changed is rolled back.

use std::fmt;

use runtime_mgmt_sdk::{
    ComputeInstance, ControlPlane, DeleteOutcome, EnvironmentDefinition, RuntimeHelper, SdkError,
};
use tracing::{info, warn};

use crate::asset::environment_asset_id;
use crate::lookup::WorkspaceIdLookup;

/// Workflow state. Each variant is reached once the step leading to it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    RuntimeDeleted,
    ComputeDeleted,
    ComputeCreated,
    EnvironmentCreated,
    RuntimeCreated,
}

impl Stage {
    /// The step that moves the workflow into this stage.
    pub fn step(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::RuntimeDeleted => "runtime deletion",
            Stage::ComputeDeleted => "compute instance deletion",
            Stage::ComputeCreated => "compute instance creation",
            Stage::EnvironmentCreated => "environment creation",
            Stage::RuntimeCreated => "runtime creation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "Start",
            Stage::RuntimeDeleted => "RuntimeDeleted",
            Stage::ComputeDeleted => "ComputeDeleted",
            Stage::ComputeCreated => "ComputeCreated",
            Stage::EnvironmentCreated => "EnvironmentCreated",
            Stage::RuntimeCreated => "RuntimeCreated",
        };
        f.write_str(name)
    }
}

/// Progress reported while the workflow runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    DeletingRuntime,
    RuntimeDeleted(DeleteOutcome),
    DeletingCompute,
    ComputeDeleted(DeleteOutcome),
    CreatingCompute,
    ComputeCreated { name: String },
    CreatingEnvironment,
    EnvironmentCreated { asset_id: String },
    CreatingRuntime,
    RuntimeCreated,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::DeletingRuntime => write!(f, "deleting runtime..."),
            Progress::RuntimeDeleted(DeleteOutcome::Deleted) => write!(f, "runtime deleted!"),
            Progress::RuntimeDeleted(DeleteOutcome::NotFound) => {
                write!(f, "runtime not found, nothing to delete")
            }
            Progress::DeletingCompute => write!(f, "deleting compute instance..."),
            Progress::ComputeDeleted(DeleteOutcome::Deleted) => {
                write!(f, "compute instance deleted!")
            }
            Progress::ComputeDeleted(DeleteOutcome::NotFound) => {
                write!(f, "compute instance not found, nothing to delete")
            }
            Progress::CreatingCompute => write!(f, "creating compute instance..."),
            Progress::ComputeCreated { name } => {
                write!(f, "compute instance created, name: {}", name)
            }
            Progress::CreatingEnvironment => write!(f, "creating environment..."),
            Progress::EnvironmentCreated { asset_id } => {
                write!(f, "created environment, asset id: {}", asset_id)
            }
            Progress::CreatingRuntime => write!(f, "creating runtime..."),
            Progress::RuntimeCreated => write!(f, "runtime created!"),
        }
    }
}

/// Workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A collaborator call failed. `stage` is the stage that was not reached.
    #[error("{} failed: {source}", .stage.step())]
    Stage { stage: Stage, source: SdkError },

    /// The workspace has no entry in the workspace-id lookup table.
    #[error("workspace id not found in lookup table for key '{0}'")]
    WorkspaceIdNotFound(String),
}

impl WorkflowError {
    fn at(stage: Stage) -> impl FnOnce(SdkError) -> Self {
        move |source| WorkflowError::Stage { stage, source }
    }

    /// The stage the workflow failed to reach.
    pub fn stage(&self) -> Stage {
        match self {
            WorkflowError::Stage { stage, .. } => *stage,
            WorkflowError::WorkspaceIdNotFound(_) => Stage::EnvironmentCreated,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub runtime_deleted: DeleteOutcome,
    pub compute_deleted: DeleteOutcome,
    pub compute_name: String,
    pub env_asset_id: String,
}

/// Recreates one runtime together with its compute instance and environment.
pub struct RuntimeLifecycle<'a, C: ControlPlane + ?Sized, R: RuntimeHelper + ?Sized> {
    control_plane: &'a C,
    helper: &'a R,
    lookup: &'a WorkspaceIdLookup,
    runtime_name: String,
}

impl<'a, C: ControlPlane + ?Sized, R: RuntimeHelper + ?Sized> RuntimeLifecycle<'a, C, R> {
    pub fn new(
        control_plane: &'a C,
        helper: &'a R,
        lookup: &'a WorkspaceIdLookup,
        runtime_name: impl Into<String>,
    ) -> Self {
        Self {
            control_plane,
            helper,
            lookup,
            runtime_name: runtime_name.into(),
        }
    }

    pub fn runtime_name(&self) -> &str {
        &self.runtime_name
    }

    /// Run every step in order, reporting progress as it goes.
    pub async fn run(
        &self,
        compute: &ComputeInstance,
        environment: &EnvironmentDefinition,
        mut progress: impl FnMut(&Progress),
    ) -> Result<LifecycleOutcome, WorkflowError> {
        info!(
            runtime = %self.runtime_name,
            scope = %self.control_plane.scope(),
            "Recreating runtime"
        );

        progress(&Progress::DeletingRuntime);
        let runtime_deleted = self.delete_runtime().await?;
        progress(&Progress::RuntimeDeleted(runtime_deleted));

        progress(&Progress::DeletingCompute);
        let compute_deleted = self.delete_compute(compute).await?;
        progress(&Progress::ComputeDeleted(compute_deleted));

        progress(&Progress::CreatingCompute);
        let compute_name = self.create_compute(compute).await?;
        progress(&Progress::ComputeCreated {
            name: compute_name.clone(),
        });

        progress(&Progress::CreatingEnvironment);
        let env_asset_id = self.create_environment(environment).await?;
        progress(&Progress::EnvironmentCreated {
            asset_id: env_asset_id.clone(),
        });

        progress(&Progress::CreatingRuntime);
        self.create_runtime(&env_asset_id, &compute_name).await?;
        progress(&Progress::RuntimeCreated);

        info!(runtime = %self.runtime_name, "Runtime recreated");

        Ok(LifecycleOutcome {
            runtime_deleted,
            compute_deleted,
            compute_name,
            env_asset_id,
        })
    }

    /// Delete the runtime. A runtime that does not exist is not an error.
    pub async fn delete_runtime(&self) -> Result<DeleteOutcome, WorkflowError> {
        let outcome = self
            .helper
            .delete_runtime(&self.runtime_name)
            .await
            .map_err(WorkflowError::at(Stage::RuntimeDeleted))?;

        if outcome.is_not_found() {
            warn!(runtime = %self.runtime_name, "Runtime not found, continuing");
        }
        Ok(outcome)
    }

    /// Delete the compute instance named by the definition.
    pub async fn delete_compute(
        &self,
        compute: &ComputeInstance,
    ) -> Result<DeleteOutcome, WorkflowError> {
        let outcome = self
            .control_plane
            .delete_compute(&compute.name)
            .await
            .map_err(WorkflowError::at(Stage::ComputeDeleted))?;

        if outcome.is_not_found() {
            warn!(compute = %compute.name, "Compute instance not found, continuing");
        }
        Ok(outcome)
    }

    /// Provision the compute instance and return its name.
    pub async fn create_compute(&self, compute: &ComputeInstance) -> Result<String, WorkflowError> {
        self.control_plane
            .create_or_update_compute(compute)
            .await
            .map_err(WorkflowError::at(Stage::ComputeCreated))
    }

    /// Publish the environment and return its fully-qualified asset id.
    pub async fn create_environment(
        &self,
        environment: &EnvironmentDefinition,
    ) -> Result<String, WorkflowError> {
        let created = self
            .control_plane
            .create_or_update_environment(environment)
            .await
            .map_err(WorkflowError::at(Stage::EnvironmentCreated))?;

        let scope = self.control_plane.scope();
        let workspace = self
            .control_plane
            .get_workspace(&scope.workspace_name)
            .await
            .map_err(WorkflowError::at(Stage::EnvironmentCreated))?;

        let workspace_id = self
            .lookup
            .get(scope)
            .ok_or_else(|| WorkflowError::WorkspaceIdNotFound(scope.lookup_key()))?;

        if let Some(reported) = workspace.workspace_id.as_deref()
            && reported != workspace_id
        {
            warn!(
                key = %scope.lookup_key(),
                lookup = %workspace_id,
                reported = %reported,
                "Workspace id in lookup table differs from the one reported by the workspace"
            );
        }

        Ok(environment_asset_id(
            &workspace.location,
            workspace_id,
            &created,
        ))
    }

    /// Create the runtime bound to the given environment and compute instance.
    pub async fn create_runtime(
        &self,
        env_asset_id: &str,
        compute_name: &str,
    ) -> Result<(), WorkflowError> {
        self.helper
            .create_runtime(&self.runtime_name, env_asset_id, compute_name)
            .await
            .map_err(WorkflowError::at(Stage::RuntimeCreated))
    }
}
