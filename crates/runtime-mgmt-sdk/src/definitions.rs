// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource definition files.
//!
//! Compute instances and environments are described by YAML files in the
//! workspace CLI (v2) format. Only the fields this tool sends to the control
//! plane are modelled; anything else in the file is ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Result, SdkError};

/// Compute instance definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComputeInstance {
    /// Compute name, unique within the workspace.
    pub name: String,
    /// Resource type. Must be `computeinstance` when present.
    #[serde(default, rename = "type")]
    pub compute_type: Option<String>,
    /// VM size, e.g. `Standard_DS3_v2`.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Region. Defaults to the workspace location when omitted.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub idle_time_before_shutdown_minutes: Option<u32>,
    #[serde(default)]
    pub ssh_public_access_enabled: Option<bool>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ComputeInstance {
    /// Minimal definition with just a name and size.
    pub fn new(name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compute_type: Some("computeinstance".to_string()),
            size: Some(size.into()),
            description: None,
            location: None,
            idle_time_before_shutdown_minutes: None,
            ssh_public_access_enabled: None,
            tags: BTreeMap::new(),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if let Some(kind) = &self.compute_type
            && !kind.eq_ignore_ascii_case("computeinstance")
        {
            return Err(format!(
                "unsupported compute type '{}', expected 'computeinstance'",
                kind
            ));
        }
        Ok(())
    }

    /// ARM request body for `PUT .../computes/{name}`.
    pub(crate) fn to_resource_body(&self, default_location: &str) -> Value {
        let mut properties = serde_json::Map::new();
        if let Some(size) = &self.size {
            properties.insert("vmSize".to_string(), json!(size));
        }
        if let Some(minutes) = self.idle_time_before_shutdown_minutes {
            properties.insert(
                "idleTimeBeforeShutdown".to_string(),
                json!(format!("PT{}M", minutes)),
            );
        }
        let ssh_access = match self.ssh_public_access_enabled {
            Some(true) => "Enabled",
            _ => "Disabled",
        };
        properties.insert(
            "sshSettings".to_string(),
            json!({ "sshPublicAccess": ssh_access }),
        );

        json!({
            "location": self.location.as_deref().unwrap_or(default_location),
            "tags": self.tags,
            "properties": {
                "computeType": "ComputeInstance",
                "description": self.description,
                "properties": Value::Object(properties),
            }
        })
    }
}

/// Environment definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentDefinition {
    /// Environment name.
    pub name: String,
    /// Explicit version. When omitted the next version is allocated on publish.
    #[serde(default, deserialize_with = "deserialize_version")]
    pub version: Option<String>,
    /// Base docker image.
    #[serde(default)]
    pub image: Option<String>,
    /// Path of the conda file, relative to the definition file.
    #[serde(default)]
    pub conda_file: Option<PathBuf>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Docker build context. Not supported; rejected on load.
    #[serde(default)]
    pub build: Option<serde_yaml_ng::Value>,
    /// Contents of `conda_file`, filled in by [`load_environment`].
    #[serde(skip)]
    pub conda_file_contents: Option<String>,
}

impl EnvironmentDefinition {
    /// Definition for a plain image-based environment.
    pub fn from_image(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            image: Some(image.into()),
            conda_file: None,
            description: None,
            os_type: None,
            tags: BTreeMap::new(),
            build: None,
            conda_file_contents: None,
        }
    }

    /// Pin the definition to an explicit version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.build.is_some() {
            return Err("docker build contexts are not supported, use 'image'".to_string());
        }
        if self.image.is_none() {
            return Err("'image' is required".to_string());
        }
        Ok(())
    }

    /// ARM request body for `PUT .../environments/{name}/versions/{version}`.
    pub(crate) fn to_resource_body(&self) -> Value {
        let os_type = match self.os_type.as_deref() {
            Some(os) if os.eq_ignore_ascii_case("windows") => "Windows",
            _ => "Linux",
        };

        json!({
            "properties": {
                "image": self.image,
                "condaFile": self.conda_file_contents,
                "description": self.description,
                "osType": os_type,
                "tags": self.tags,
            }
        })
    }
}

/// Load a compute instance definition from a YAML file.
pub fn load_compute(path: impl AsRef<Path>) -> Result<ComputeInstance> {
    let path = path.as_ref();
    let compute: ComputeInstance = read_yaml(path)?;
    compute.validate().map_err(|message| definition_error(path, message))?;
    Ok(compute)
}

/// Load an environment definition from a YAML file.
///
/// A referenced conda file is read relative to the definition's directory.
pub fn load_environment(path: impl AsRef<Path>) -> Result<EnvironmentDefinition> {
    let path = path.as_ref();
    let mut environment: EnvironmentDefinition = read_yaml(path)?;
    environment
        .validate()
        .map_err(|message| definition_error(path, message))?;

    if let Some(conda_file) = &environment.conda_file {
        let conda_path = match path.parent() {
            Some(dir) if conda_file.is_relative() => dir.join(conda_file),
            _ => conda_file.clone(),
        };
        let contents = std::fs::read_to_string(&conda_path).map_err(|e| {
            definition_error(
                path,
                format!("cannot read conda file {}: {}", conda_path.display(), e),
            )
        })?;
        environment.conda_file_contents = Some(contents);
    }

    Ok(environment)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| definition_error(path, format!("cannot read file: {}", e)))?;
    serde_yaml_ng::from_str(&contents).map_err(|e| definition_error(path, e.to_string()))
}

fn definition_error(path: &Path, message: impl Into<String>) -> SdkError {
    SdkError::Definition {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Versions may be written as `version: 3` or `version: "3"`.
fn deserialize_version<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Version>::deserialize(deserializer)?.map(|v| match v {
        Version::Text(s) => s,
        Version::Number(n) => n.to_string(),
    }))
}
