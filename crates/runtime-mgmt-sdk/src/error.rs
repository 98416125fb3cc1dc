// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for runtime-mgmt-sdk.

use thiserror::Error;

/// Result type using SdkError.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur when talking to the workspace control plane.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable access token could be obtained.
    #[error("credential error: {0}")]
    Credential(String),

    /// The HTTP request could not be sent or the response not read.
    #[error("connection error: {0}")]
    Connection(String),

    /// Request or long-running operation timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Server returned an error response.
    #[error("server error [{code}]: {message}")]
    Server { code: String, message: String },

    /// Resource does not exist (HTTP 404).
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A long-running operation reached a failed terminal state.
    #[error("operation failed [{status}]: {message}")]
    OperationFailed { status: String, message: String },

    /// Invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A resource definition file could not be loaded.
    #[error("invalid definition {path}: {message}")]
    Definition { path: String, message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SdkError {
    /// Whether this error means the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound(_))
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SdkError::Serialization(err.to_string())
        } else {
            SdkError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}
