// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! manage-runtime
//!
//! Recreates the example flow runtime:
//! - deletes the runtime and its compute instance
//! - creates the compute instance and publishes the environment
//! - creates the runtime on top of both

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use runtime_mgmt::{Args, Config, RuntimeLifecycle, WorkspaceIdLookup};
use runtime_mgmt_sdk::{
    FlowRuntimeClient, SdkConfig, WorkspaceClient, default_credential, load_compute,
    load_environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr, progress lines to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runtime_mgmt=info,runtime_mgmt_sdk=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let config = Config::from(Args::parse());
    let scope = config.scope()?;
    let sdk_config = SdkConfig::from_env()?;

    let compute = load_compute(&config.compute_file)
        .with_context(|| format!("loading {}", config.compute_file.display()))?;
    let environment = load_environment(&config.environment_file)
        .with_context(|| format!("loading {}", config.environment_file.display()))?;
    let lookup = WorkspaceIdLookup::load(&config.workspace_ids_file)?;

    info!(
        scope = %scope,
        runtime = %config.runtime_name,
        compute = %compute.name,
        environment = %environment.name,
        "Starting runtime lifecycle"
    );

    let credential = default_credential();
    let workspace_client = WorkspaceClient::new(sdk_config.clone(), credential.clone(), scope)?;

    let runtime_client =
        FlowRuntimeClient::for_workspace(sdk_config, credential, &workspace_client)
            .await
            .context("resolving flow service endpoint")?;
    info!(endpoint = %runtime_client.endpoint(), "Using flow service");

    let lifecycle = RuntimeLifecycle::new(
        &workspace_client,
        &runtime_client,
        &lookup,
        config.runtime_name.clone(),
    );

    let outcome = lifecycle
        .run(&compute, &environment, |progress| println!("{}", progress))
        .await?;

    info!(
        runtime = %lifecycle.runtime_name(),
        compute = %outcome.compute_name,
        environment = %outcome.env_asset_id,
        "Done"
    );

    Ok(())
}
