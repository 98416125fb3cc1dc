// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! High-level types for the management SDK.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coordinates of the workspace every operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceScope {
    /// Subscription ID.
    pub subscription_id: String,
    /// Resource group name.
    pub resource_group_name: String,
    /// Workspace name.
    pub workspace_name: String,
}

impl WorkspaceScope {
    /// Create a new scope.
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        workspace_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            workspace_name: workspace_name.into(),
        }
    }

    /// Key used by workspace-id lookup tables: `{subscription}/{resource_group}/{workspace}`.
    pub fn lookup_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.subscription_id, self.resource_group_name, self.workspace_name
        )
    }

    /// ARM resource path of a workspace in this subscription and resource group.
    pub fn workspace_path(&self, workspace_name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(&self.resource_group_name),
            urlencoding::encode(workspace_name),
        )
    }

    /// ARM resource path of the scoped workspace.
    pub fn resource_path(&self) -> String {
        self.workspace_path(&self.workspace_name)
    }
}

impl fmt::Display for WorkspaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lookup_key())
    }
}

/// Workspace metadata returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// Workspace name.
    pub name: String,
    /// Azure region, e.g. "eastus".
    pub location: String,
    /// Workspace GUID reported by the control plane, when present.
    pub workspace_id: Option<String>,
}

/// A published environment version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVersion {
    /// Environment name.
    pub name: String,
    /// Version label.
    pub version: String,
}

impl EnvironmentVersion {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// What a delete call found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The resource existed and has been removed.
    Deleted,
    /// There was nothing to delete.
    NotFound,
}

impl DeleteOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeleteOutcome::NotFound)
    }
}

/// Status of an ARM long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// Still running (any non-terminal status string).
    InProgress(String),
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Canceled,
}

impl OperationStatus {
    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::InProgress(_))
    }
}

impl From<&str> for OperationStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed,
            "canceled" | "cancelled" => OperationStatus::Canceled,
            _ => OperationStatus::InProgress(value.to_string()),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::InProgress(s) => f.write_str(s),
            OperationStatus::Succeeded => f.write_str("Succeeded"),
            OperationStatus::Failed => f.write_str("Failed"),
            OperationStatus::Canceled => f.write_str("Canceled"),
        }
    }
}

/// Status of a flow runtime. Parsed without regard to case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuntimeStatus {
    Creating,
    Updating,
    Deleting,
    Running,
    Succeeded,
    Failed,
    NotAvailable,
    /// Any status this SDK does not know about, as received.
    Unknown(String),
}

impl From<&str> for RuntimeStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "creating" => RuntimeStatus::Creating,
            "updating" => RuntimeStatus::Updating,
            "deleting" => RuntimeStatus::Deleting,
            "running" => RuntimeStatus::Running,
            "succeeded" => RuntimeStatus::Succeeded,
            "failed" => RuntimeStatus::Failed,
            "notavailable" => RuntimeStatus::NotAvailable,
            _ => RuntimeStatus::Unknown(value.to_string()),
        }
    }
}

impl From<String> for RuntimeStatus {
    fn from(value: String) -> Self {
        RuntimeStatus::from(value.as_str())
    }
}

impl From<RuntimeStatus> for String {
    fn from(status: RuntimeStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeStatus::Creating => f.write_str("Creating"),
            RuntimeStatus::Updating => f.write_str("Updating"),
            RuntimeStatus::Deleting => f.write_str("Deleting"),
            RuntimeStatus::Running => f.write_str("Running"),
            RuntimeStatus::Succeeded => f.write_str("Succeeded"),
            RuntimeStatus::Failed => f.write_str("Failed"),
            RuntimeStatus::NotAvailable => f.write_str("NotAvailable"),
            RuntimeStatus::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl RuntimeStatus {
    /// Check if the runtime has settled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RuntimeStatus::Running
                | RuntimeStatus::Succeeded
                | RuntimeStatus::Failed
                | RuntimeStatus::NotAvailable
        )
    }

    /// Check if the runtime is usable.
    pub fn is_ready(&self) -> bool {
        matches!(self, RuntimeStatus::Running | RuntimeStatus::Succeeded)
    }
}

/// Flow runtime as reported by the flow service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRuntimeInfo {
    /// Runtime name.
    pub runtime_name: String,
    /// Current status.
    pub status: RuntimeStatus,
    /// Compute instance the runtime is bound to.
    #[serde(default)]
    pub compute_instance_name: Option<String>,
    /// Environment asset id the runtime uses.
    #[serde(default)]
    pub environment: Option<String>,
    /// Error message when the runtime failed.
    #[serde(default)]
    pub error_message: Option<String>,
}

// =========================================================================
// Wire types
// =========================================================================

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Body returned by an `Azure-AsyncOperation` URL.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AsyncOperationResponse {
    pub status: String,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WorkspaceResource {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub properties: WorkspaceProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkspaceProperties {
    #[serde(default)]
    pub workspace_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnvironmentContainerResource {
    #[serde(default)]
    pub properties: EnvironmentContainerProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnvironmentContainerProperties {
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub next_version: Option<String>,
}
