// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workspace-id lookup table.
//!
//! Maps `{subscription}/{resource_group}/{workspace}` keys to workspace ids.
//! The table is maintained by hand in a YAML file:
//!
//! ```yaml
//! 00000000-0000-0000-0000-000000000000/my-rg/my-workspace: 11111111-2222-3333-4444-555555555555
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use runtime_mgmt_sdk::WorkspaceScope;

use crate::config::ConfigError;

/// Workspace ids keyed by workspace coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceIdLookup {
    entries: BTreeMap<String, String>,
}

impl WorkspaceIdLookup {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the id for a workspace.
    pub fn insert(&mut self, scope: &WorkspaceScope, workspace_id: impl Into<String>) {
        self.entries.insert(scope.lookup_key(), workspace_id.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_entry(mut self, scope: &WorkspaceScope, workspace_id: impl Into<String>) -> Self {
        self.insert(scope, workspace_id);
        self
    }

    /// Workspace id for `scope`, if present.
    pub fn get(&self, scope: &WorkspaceScope) -> Option<&str> {
        self.entries.get(&scope.lookup_key()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a YAML mapping of keys to ids.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }
        let entries: Option<BTreeMap<String, String>> = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::InvalidLookup(e.to_string()))?;
        let entries = entries.unwrap_or_default();

        for key in entries.keys() {
            let parts: Vec<&str> = key.split('/').collect();
            if parts.len() != 3 || parts.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidLookup(format!(
                    "key '{}' is not of the form subscription/resource-group/workspace",
                    key
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Load the table from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&contents)
    }
}
