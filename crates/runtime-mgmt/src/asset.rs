// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Environment asset identifiers.

use runtime_mgmt_sdk::EnvironmentVersion;

/// Fully-qualified id of an environment version:
/// `azureml://locations/{location}/workspaces/{workspace_id}/environments/{name}/versions/{version}`.
pub fn environment_asset_id(
    location: &str,
    workspace_id: &str,
    environment: &EnvironmentVersion,
) -> String {
    format!(
        "azureml://locations/{}/workspaces/{}/environments/{}/versions/{}",
        location, workspace_id, environment.name, environment.version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_asset_id() {
        let environment = EnvironmentVersion::new("env1", "3");
        assert_eq!(
            environment_asset_id("eastus", "abc123", &environment),
            "azureml://locations/eastus/workspaces/abc123/environments/env1/versions/3"
        );
    }

    #[test]
    fn test_environment_asset_id_keeps_values_verbatim() {
        let environment = EnvironmentVersion::new("example-runtime-env", "20240105.1");
        assert_eq!(
            environment_asset_id(
                "westeurope",
                "7f3e2c1a-0000-4d2b-9a55-0123456789ab",
                &environment
            ),
            "azureml://locations/westeurope/workspaces/7f3e2c1a-0000-4d2b-9a55-0123456789ab/environments/example-runtime-env/versions/20240105.1"
        );
    }
}
