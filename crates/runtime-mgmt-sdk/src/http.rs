// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Authenticated HTTP pipeline shared by the workspace and runtime clients.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::SdkConfig;
use crate::credential::TokenCredential;
use crate::error::{Result, SdkError};
use crate::types::ErrorResponse;

#[derive(Clone)]
pub(crate) struct HttpPipeline {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    token_resource: String,
    request_timeout_ms: u64,
}

impl HttpPipeline {
    pub(crate) fn new(config: &SdkConfig, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("runtime-mgmt-sdk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SdkError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            credential,
            token_resource: config.token_resource.clone(),
            request_timeout_ms: config.request_timeout.as_millis() as u64,
        })
    }

    /// Send an authenticated request. The response status is not checked.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let token = self.credential.get_token(&self.token_resource).await?;

        debug!(%method, url, "Sending request");

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&token.token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                SdkError::Timeout(self.request_timeout_ms)
            } else {
                SdkError::from(e)
            }
        })
    }

    /// Send a request and fail on any non-success status.
    pub(crate) async fn send_checked(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let response = self.send(method, url, query, body).await?;
        check_status(response).await
    }
}

/// Return the response unchanged if it succeeded, otherwise the mapped error.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    if status == StatusCode::NOT_FOUND {
        return Err(SdkError::NotFound(url));
    }

    let text = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) if !body.error.code.is_empty() || !body.error.message.is_empty() => {
            SdkError::Server {
                code: body.error.code,
                message: body.error.message,
            }
        }
        _ => SdkError::Server {
            code: status.as_u16().to_string(),
            message: if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                text
            },
        },
    })
}
