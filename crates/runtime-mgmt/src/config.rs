// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the runtime lifecycle tool.

use std::path::PathBuf;

use runtime_mgmt_sdk::WorkspaceScope;

use crate::cli::Args;

/// Runtime recreated when no name is configured.
pub const DEFAULT_RUNTIME_NAME: &str = "example-runtime-ci";
/// Compute instance definition used when no path is configured.
pub const DEFAULT_COMPUTE_FILE: &str = "compute-instance.yml";
/// Environment definition used when no path is configured.
pub const DEFAULT_ENVIRONMENT_FILE: &str = "environment.yml";
/// Workspace-id lookup table used when no path is configured.
pub const DEFAULT_WORKSPACE_IDS_FILE: &str = "workspace-ids.yml";

/// Settings for one run, resolved from arguments and environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Subscription ID, if given
    pub subscription_id: Option<String>,
    /// Resource group, if given
    pub resource_group_name: Option<String>,
    /// Workspace name, if given
    pub workspace_name: Option<String>,
    /// Runtime to delete and recreate
    pub runtime_name: String,
    /// Compute instance definition file
    pub compute_file: PathBuf,
    /// Environment definition file
    pub environment_file: PathBuf,
    /// Workspace-id lookup file
    pub workspace_ids_file: PathBuf,
}

impl Config {
    /// Workspace coordinates. Each one must be present; values are not validated further.
    pub fn scope(&self) -> Result<WorkspaceScope, ConfigError> {
        let subscription_id = required(&self.subscription_id, "--subscription-id")?;
        let resource_group_name = required(&self.resource_group_name, "--resource-group-name")?;
        let workspace_name = required(&self.workspace_name, "--workspace-name")?;

        Ok(WorkspaceScope::new(
            subscription_id,
            resource_group_name,
            workspace_name,
        ))
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            subscription_id: args.subscription_id,
            resource_group_name: args.resource_group_name,
            workspace_name: args.workspace_name,
            runtime_name: args.runtime_name,
            compute_file: args.compute_file,
            environment_file: args.environment_file,
            workspace_ids_file: args.workspace_ids_file,
        }
    }
}

fn required<'a>(value: &'a Option<String>, option: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingOption(option))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required option was not supplied.
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
    /// A configuration file could not be read.
    #[error("Cannot read {path}: {message}")]
    ReadFile { path: String, message: String },
    /// The workspace-id lookup table is malformed.
    #[error("Invalid workspace-id lookup table: {0}")]
    InvalidLookup(String),
}
