// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lifecycle workflow tests against in-memory collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use runtime_mgmt::{Progress, RuntimeLifecycle, Stage, WorkflowError, WorkspaceIdLookup};
use runtime_mgmt_sdk::{
    ComputeInstance, ControlPlane, DeleteOutcome, EnvironmentDefinition, EnvironmentVersion,
    Result, RuntimeHelper, SdkError, WorkspaceInfo, WorkspaceScope,
};

const EXPECTED_ASSET_ID: &str =
    "azureml://locations/eastus/workspaces/abc123/environments/env1/versions/3";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    DeleteRuntime(String),
    DeleteCompute(String),
    CreateCompute(String),
    CreateEnvironment(String),
    GetWorkspace(String),
    CreateRuntime {
        name: String,
        env_asset_id: String,
        ci_name: String,
    },
}

type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().unwrap().push(call);
}

struct MockControlPlane {
    scope: WorkspaceScope,
    location: String,
    created_version: String,
    compute_missing: bool,
    fail_compute_create: bool,
    /// Name reported back by compute creation; the definition's name when unset.
    assigned_compute_name: Option<String>,
    reported_workspace_id: Option<String>,
    calls: CallLog,
}

impl MockControlPlane {
    fn new(calls: CallLog) -> Self {
        Self {
            scope: WorkspaceScope::new("sub1", "rg1", "ws1"),
            location: "eastus".to_string(),
            created_version: "3".to_string(),
            compute_missing: false,
            fail_compute_create: false,
            assigned_compute_name: None,
            reported_workspace_id: None,
            calls,
        }
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    fn scope(&self) -> &WorkspaceScope {
        &self.scope
    }

    async fn create_or_update_compute(&self, compute: &ComputeInstance) -> Result<String> {
        record(&self.calls, Call::CreateCompute(compute.name.clone()));
        if self.fail_compute_create {
            return Err(SdkError::OperationFailed {
                status: "Failed".to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        Ok(self
            .assigned_compute_name
            .clone()
            .unwrap_or_else(|| compute.name.clone()))
    }

    async fn delete_compute(&self, name: &str) -> Result<DeleteOutcome> {
        record(&self.calls, Call::DeleteCompute(name.to_string()));
        if self.compute_missing {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }

    async fn create_or_update_environment(
        &self,
        environment: &EnvironmentDefinition,
    ) -> Result<EnvironmentVersion> {
        record(&self.calls, Call::CreateEnvironment(environment.name.clone()));
        Ok(EnvironmentVersion::new(
            environment.name.clone(),
            self.created_version.clone(),
        ))
    }

    async fn get_workspace(&self, name: &str) -> Result<WorkspaceInfo> {
        record(&self.calls, Call::GetWorkspace(name.to_string()));
        Ok(WorkspaceInfo {
            name: name.to_string(),
            location: self.location.clone(),
            workspace_id: self.reported_workspace_id.clone(),
        })
    }
}

struct MockRuntimeHelper {
    runtime_missing: bool,
    fail_runtime_delete: bool,
    calls: CallLog,
}

impl MockRuntimeHelper {
    fn new(calls: CallLog) -> Self {
        Self {
            runtime_missing: false,
            fail_runtime_delete: false,
            calls,
        }
    }
}

#[async_trait]
impl RuntimeHelper for MockRuntimeHelper {
    async fn delete_runtime(&self, name: &str) -> Result<DeleteOutcome> {
        record(&self.calls, Call::DeleteRuntime(name.to_string()));
        if self.fail_runtime_delete {
            return Err(SdkError::Server {
                code: "500".to_string(),
                message: "backend unavailable".to_string(),
            });
        }
        if self.runtime_missing {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }

    async fn create_runtime(&self, name: &str, env_asset_id: &str, ci_name: &str) -> Result<()> {
        record(
            &self.calls,
            Call::CreateRuntime {
                name: name.to_string(),
                env_asset_id: env_asset_id.to_string(),
                ci_name: ci_name.to_string(),
            },
        );
        Ok(())
    }
}

fn compute() -> ComputeInstance {
    ComputeInstance::new("ci1", "Standard_DS3_v2")
}

fn environment() -> EnvironmentDefinition {
    EnvironmentDefinition::from_image(
        "env1",
        "mcr.microsoft.com/azureml/promptflow/promptflow-runtime:latest",
    )
}

fn lookup() -> WorkspaceIdLookup {
    WorkspaceIdLookup::new().with_entry(&WorkspaceScope::new("sub1", "rg1", "ws1"), "abc123")
}

#[tokio::test]
async fn test_steps_run_in_order() {
    let calls = CallLog::default();
    let control_plane = MockControlPlane::new(calls.clone());
    let helper = MockRuntimeHelper::new(calls.clone());
    let lookup = lookup();

    let lifecycle = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci");
    let outcome = lifecycle
        .run(&compute(), &environment(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.compute_name, "ci1");
    assert_eq!(outcome.env_asset_id, EXPECTED_ASSET_ID);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::DeleteRuntime("example-runtime-ci".to_string()),
            Call::DeleteCompute("ci1".to_string()),
            Call::CreateCompute("ci1".to_string()),
            Call::CreateEnvironment("env1".to_string()),
            Call::GetWorkspace("ws1".to_string()),
            Call::CreateRuntime {
                name: "example-runtime-ci".to_string(),
                env_asset_id: EXPECTED_ASSET_ID.to_string(),
                ci_name: "ci1".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_progress_lines() {
    let calls = CallLog::default();
    let control_plane = MockControlPlane::new(calls.clone());
    let helper = MockRuntimeHelper::new(calls);
    let lookup = lookup();

    let mut lines = Vec::new();
    RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .run(&compute(), &environment(), |progress| {
            lines.push(progress.to_string())
        })
        .await
        .unwrap();

    assert_eq!(
        lines,
        vec![
            "deleting runtime...".to_string(),
            "runtime deleted!".to_string(),
            "deleting compute instance...".to_string(),
            "compute instance deleted!".to_string(),
            "creating compute instance...".to_string(),
            "compute instance created, name: ci1".to_string(),
            "creating environment...".to_string(),
            format!("created environment, asset id: {}", EXPECTED_ASSET_ID),
            "creating runtime...".to_string(),
            "runtime created!".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_compute_failure_stops_workflow() {
    let calls = CallLog::default();
    let mut control_plane = MockControlPlane::new(calls.clone());
    control_plane.fail_compute_create = true;
    let helper = MockRuntimeHelper::new(calls.clone());
    let lookup = lookup();

    let err = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .run(&compute(), &environment(), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::ComputeCreated);
    assert!(matches!(
        err,
        WorkflowError::Stage {
            source: SdkError::OperationFailed { .. },
            ..
        }
    ));
    assert!(err.to_string().starts_with("compute instance creation failed"));

    let calls = calls.lock().unwrap();
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateEnvironment(_))));
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateRuntime { .. })));
}

#[tokio::test]
async fn test_missing_workspace_id_skips_runtime_creation() {
    let calls = CallLog::default();
    let control_plane = MockControlPlane::new(calls.clone());
    let helper = MockRuntimeHelper::new(calls.clone());
    let lookup = WorkspaceIdLookup::new()
        .with_entry(&WorkspaceScope::new("sub1", "rg1", "other-ws"), "def456");

    let err = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .run(&compute(), &environment(), |_| {})
        .await
        .unwrap_err();

    match &err {
        WorkflowError::WorkspaceIdNotFound(key) => assert_eq!(key, "sub1/rg1/ws1"),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(err.stage(), Stage::EnvironmentCreated);

    let calls = calls.lock().unwrap();
    assert!(calls.contains(&Call::CreateEnvironment("env1".to_string())));
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateRuntime { .. })));
}

#[tokio::test]
async fn test_missing_resources_are_not_errors() {
    let calls = CallLog::default();
    let mut control_plane = MockControlPlane::new(calls.clone());
    control_plane.compute_missing = true;
    let mut helper = MockRuntimeHelper::new(calls.clone());
    helper.runtime_missing = true;
    let lookup = lookup();

    let mut lines = Vec::new();
    let outcome = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .run(&compute(), &environment(), |progress| lines.push(progress.clone()))
        .await
        .unwrap();

    assert_eq!(outcome.runtime_deleted, DeleteOutcome::NotFound);
    assert_eq!(outcome.compute_deleted, DeleteOutcome::NotFound);
    assert!(lines.contains(&Progress::RuntimeDeleted(DeleteOutcome::NotFound)));
    assert!(lines.contains(&Progress::RuntimeCreated));
    assert_eq!(calls.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn test_runtime_receives_created_names() {
    let calls = CallLog::default();
    let mut control_plane = MockControlPlane::new(calls.clone());
    control_plane.location = "westeurope".to_string();
    control_plane.created_version = "12".to_string();
    control_plane.assigned_compute_name = Some("server-assigned".to_string());
    let helper = MockRuntimeHelper::new(calls.clone());
    let lookup = lookup();

    let compute = ComputeInstance::new("nightly-ci", "Standard_DS3_v2");
    let environment = EnvironmentDefinition::from_image("nightly-env", "python:3.11");

    let outcome = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "nightly")
        .run(&compute, &environment, |_| {})
        .await
        .unwrap();
    assert_eq!(outcome.compute_name, "server-assigned");

    let calls = calls.lock().unwrap();
    assert!(calls.contains(&Call::CreateCompute("nightly-ci".to_string())));
    assert_eq!(
        calls.last(),
        Some(&Call::CreateRuntime {
            name: "nightly".to_string(),
            env_asset_id:
                "azureml://locations/westeurope/workspaces/abc123/environments/nightly-env/versions/12"
                    .to_string(),
            ci_name: "server-assigned".to_string(),
        })
    );
}

#[tokio::test]
async fn test_create_environment_asset_id() {
    let calls = CallLog::default();
    let control_plane = MockControlPlane::new(calls.clone());
    let helper = MockRuntimeHelper::new(calls);
    let lookup = lookup();

    let asset_id = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .create_environment(&environment())
        .await
        .unwrap();

    assert_eq!(asset_id, EXPECTED_ASSET_ID);
}

#[tokio::test]
async fn test_runtime_delete_failure_stops_workflow() {
    let calls = CallLog::default();
    let control_plane = MockControlPlane::new(calls.clone());
    let mut helper = MockRuntimeHelper::new(calls.clone());
    helper.fail_runtime_delete = true;
    let lookup = lookup();

    let mut lines = Vec::new();
    let err = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .run(&compute(), &environment(), |progress| lines.push(progress.clone()))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::RuntimeDeleted);
    assert!(err.to_string().starts_with("runtime deletion failed"));
    assert_eq!(lines, vec![Progress::DeletingRuntime]);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::DeleteRuntime("example-runtime-ci".to_string())]
    );
}

#[tokio::test]
async fn test_lookup_id_wins_over_reported_workspace_id() {
    let calls = CallLog::default();
    let mut control_plane = MockControlPlane::new(calls.clone());
    control_plane.reported_workspace_id = Some("reported-id".to_string());
    let helper = MockRuntimeHelper::new(calls);
    let lookup = lookup();

    let asset_id = RuntimeLifecycle::new(&control_plane, &helper, &lookup, "example-runtime-ci")
        .create_environment(&environment())
        .await
        .unwrap();

    assert_eq!(asset_id, EXPECTED_ASSET_ID);
}
