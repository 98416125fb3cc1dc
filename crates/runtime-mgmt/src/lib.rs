// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runtime lifecycle tool
//!
//! Deletes and recreates a flow runtime together with the compute instance
//! and environment it runs on. The workflow in [`workflow`] is written against
//! the [`ControlPlane`](runtime_mgmt_sdk::ControlPlane) and
//! [`RuntimeHelper`](runtime_mgmt_sdk::RuntimeHelper) traits; the binary wires
//! it to the HTTP clients from `runtime-mgmt-sdk`.

pub mod asset;
pub mod cli;
pub mod config;
pub mod lookup;
pub mod workflow;

pub use asset::environment_asset_id;
pub use cli::Args;
pub use config::{Config, ConfigError};
pub use lookup::WorkspaceIdLookup;
pub use workflow::{LifecycleOutcome, Progress, RuntimeLifecycle, Stage, WorkflowError};
