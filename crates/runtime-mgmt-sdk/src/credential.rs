// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Credential providers.
//!
//! Tokens come either from `AZURE_ACCESS_TOKEN` or from the Azure CLI's
//! logged-in account.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::{Result, SdkError};

/// Tokens this close to expiry are refreshed.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// A bearer token with its expiry.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    /// `None` means the expiry is unknown and the token is used as-is.
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Whether the token is still usable at `now`, allowing for the refresh margin.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_on {
            Some(expires_on) => expires_on - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
            None => true,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for the control plane.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Get a token for `resource` (e.g. "https://management.azure.com").
    async fn get_token(&self, resource: &str) -> Result<AccessToken>;
}

/// A fixed token, typically injected by CI through `AZURE_ACCESS_TOKEN`.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from `AZURE_ACCESS_TOKEN`, if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("AZURE_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
    }
}

impl fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _resource: &str) -> Result<AccessToken> {
        Ok(AccessToken::new(self.token.clone(), None))
    }
}

/// Token provider backed by `az account get-access-token`.
#[derive(Debug)]
pub struct AzureCliCredential {
    program: String,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        Self::with_program(program)
    }

    /// Use a different executable in place of `az`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn fetch(&self, resource: &str) -> Result<AccessToken> {
        let output = tokio::process::Command::new(&self.program)
            .args([
                "account",
                "get-access-token",
                "--output",
                "json",
                "--resource",
                resource,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SdkError::Credential(format!(
                        "Azure CLI ('{}') not found on PATH",
                        self.program
                    ))
                } else {
                    SdkError::Credential(format!("failed to run {}: {}", self.program, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SdkError::Credential(format!(
                "az account get-access-token failed: {}. Run 'az login' first.",
                stderr.trim()
            )));
        }

        parse_cli_token(&output.stdout)
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    #[instrument(skip(self))]
    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(resource)
            && token.is_fresh_at(Utc::now())
        {
            return Ok(token.clone());
        }

        debug!("Requesting token from Azure CLI");
        let token = self.fetch(resource).await?;
        cache.insert(resource.to_string(), token.clone());
        Ok(token)
    }
}

/// `AZURE_ACCESS_TOKEN` when set, otherwise the Azure CLI.
pub fn default_credential() -> Arc<dyn TokenCredential> {
    match StaticTokenCredential::from_env() {
        Some(credential) => {
            debug!("Using token from AZURE_ACCESS_TOKEN");
            Arc::new(credential)
        }
        None => Arc::new(AzureCliCredential::new()),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
    /// Local time, e.g. "2025-01-31 14:05:09.000000". Present in all CLI versions.
    #[serde(default)]
    expires_on: Option<String>,
    /// POSIX timestamp. Added in newer CLI versions.
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

/// Parse the JSON printed by `az account get-access-token`.
pub(crate) fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken> {
    let response: CliTokenResponse = serde_json::from_slice(stdout).map_err(|e| {
        SdkError::Credential(format!("unexpected output from Azure CLI: {}", e))
    })?;

    let expires_on = match (response.expires_on_epoch, response.expires_on.as_deref()) {
        (Some(epoch), _) => Utc.timestamp_opt(epoch, 0).single(),
        (None, Some(local)) => NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc)),
        (None, None) => None,
    };

    Ok(AccessToken::new(response.access_token, expires_on))
}
