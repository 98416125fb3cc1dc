// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runtime Management SDK
//!
//! Clients for the resources behind a flow runtime in an ML workspace:
//! compute instances, environments and the runtime itself.
//!
//! # Architecture
//!
//! - [`WorkspaceClient`] talks to Azure Resource Manager for workspace
//!   metadata, compute instances and environment versions.
//! - [`FlowRuntimeClient`] talks to the regional flow service for runtimes.
//! - [`ControlPlane`] and [`RuntimeHelper`] are the seams the lifecycle
//!   workflow is written against.
//!
//! # Example
//!
//! ```no_run
//! use runtime_mgmt_sdk::{WorkspaceClient, WorkspaceScope, load_compute};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scope = WorkspaceScope::new("sub-id", "my-rg", "my-workspace");
//! let client = WorkspaceClient::from_env(scope)?;
//!
//! let workspace = client.get_workspace("my-workspace").await?;
//! println!("Workspace location: {}", workspace.location);
//!
//! let compute = load_compute("compute-instance.yml")?;
//! let name = client.create_or_update_compute(&compute).await?;
//! println!("Compute ready: {}", name);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod credential;
mod definitions;
mod error;
mod http;
mod lro;
mod runtime;
mod traits;
mod types;

pub use client::WorkspaceClient;
pub use config::{DEFAULT_API_VERSION, DEFAULT_ARM_ENDPOINT, SdkConfig};
pub use credential::{
    AccessToken, AzureCliCredential, StaticTokenCredential, TokenCredential, default_credential,
};
pub use definitions::{ComputeInstance, EnvironmentDefinition, load_compute, load_environment};
pub use error::{Result, SdkError};
pub use lro::poll_until;
pub use runtime::FlowRuntimeClient;
pub use traits::{ControlPlane, RuntimeHelper};
pub use types::{
    DeleteOutcome, EnvironmentVersion, FlowRuntimeInfo, OperationStatus, RuntimeStatus,
    WorkspaceInfo, WorkspaceScope,
};
