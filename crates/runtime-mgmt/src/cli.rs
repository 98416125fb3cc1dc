// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    DEFAULT_COMPUTE_FILE, DEFAULT_ENVIRONMENT_FILE, DEFAULT_RUNTIME_NAME, DEFAULT_WORKSPACE_IDS_FILE,
};

/// Recreate the example flow runtime, its compute instance and environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "manage-runtime", version, about)]
pub struct Args {
    /// Subscription ID of the workspace
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    /// Resource group of the workspace
    #[arg(long, env = "AZURE_RESOURCE_GROUP")]
    pub resource_group_name: Option<String>,

    /// Workspace name
    #[arg(long, env = "AZURE_ML_WORKSPACE_NAME")]
    pub workspace_name: Option<String>,

    /// Name of the runtime to recreate
    #[arg(long, env = "RUNTIME_MGMT_RUNTIME_NAME", default_value = DEFAULT_RUNTIME_NAME)]
    pub runtime_name: String,

    /// Compute instance definition (YAML)
    #[arg(long, env = "RUNTIME_MGMT_COMPUTE_FILE", default_value = DEFAULT_COMPUTE_FILE)]
    pub compute_file: PathBuf,

    /// Environment definition (YAML)
    #[arg(long, env = "RUNTIME_MGMT_ENVIRONMENT_FILE", default_value = DEFAULT_ENVIRONMENT_FILE)]
    pub environment_file: PathBuf,

    /// Workspace-id lookup table (YAML)
    #[arg(long, env = "RUNTIME_MGMT_WORKSPACE_IDS_FILE", default_value = DEFAULT_WORKSPACE_IDS_FILE)]
    pub workspace_ids_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workspace_coordinates() {
        let args = Args::try_parse_from([
            "manage-runtime",
            "--subscription-id",
            "sub1",
            "--resource-group-name",
            "rg1",
            "--workspace-name",
            "ws1",
        ])
        .unwrap();

        assert_eq!(args.subscription_id.as_deref(), Some("sub1"));
        assert_eq!(args.resource_group_name.as_deref(), Some("rg1"));
        assert_eq!(args.workspace_name.as_deref(), Some("ws1"));
    }

    #[test]
    fn test_file_overrides() {
        let args = Args::try_parse_from([
            "manage-runtime",
            "--runtime-name",
            "nightly",
            "--compute-file",
            "ci/compute.yml",
            "--environment-file",
            "ci/env.yml",
        ])
        .unwrap();

        assert_eq!(args.runtime_name, "nightly");
        assert_eq!(args.compute_file, PathBuf::from("ci/compute.yml"));
        assert_eq!(args.environment_file, PathBuf::from("ci/env.yml"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["manage-runtime", "--dry-run"]).is_err());
    }
}
