// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Long-running operation polling.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::{Result, SdkError};
use crate::http::{HttpPipeline, check_status};
use crate::types::{AsyncOperationResponse, OperationStatus};

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Where to poll an accepted ARM operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollTarget {
    /// `Azure-AsyncOperation` status URL; finishes on a terminal `status` field.
    AsyncOperation(String),
    /// `Location` URL; finishes when it stops returning 202.
    Location(String),
}

impl PollTarget {
    /// Pick the poll URL from response headers, preferring `Azure-AsyncOperation`.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        header(AZURE_ASYNC_OPERATION)
            .map(PollTarget::AsyncOperation)
            .or_else(|| header(LOCATION.as_str()).map(PollTarget::Location))
    }
}

/// Repeatedly call `poll` until it yields a value, sleeping `interval` between calls.
///
/// Fails with [`SdkError::Timeout`] once `timeout` has elapsed.
pub async fn poll_until<T, F, Fut>(interval: Duration, timeout: Duration, mut poll: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = poll().await? {
            return Ok(value);
        }
        if started.elapsed() >= timeout {
            return Err(SdkError::Timeout(timeout.as_millis() as u64));
        }
        tokio::time::sleep(interval).await;
    }
}

/// Wait for an ARM long-running operation to finish.
pub(crate) async fn wait_for_operation(
    pipeline: &HttpPipeline,
    target: &PollTarget,
    interval: Duration,
    timeout: Duration,
) -> Result<()> {
    poll_until(interval, timeout, move || async move {
        match target {
            PollTarget::AsyncOperation(url) => {
                let response = pipeline.send_checked(Method::GET, url, &[], None).await?;
                let body: AsyncOperationResponse = response.json().await?;
                let status = OperationStatus::from(body.status.as_str());
                debug!(%status, "Polled operation");
                match status {
                    OperationStatus::Succeeded => Ok(Some(())),
                    OperationStatus::InProgress(_) => Ok(None),
                    OperationStatus::Failed | OperationStatus::Canceled => {
                        let detail = body.error.unwrap_or_default();
                        Err(SdkError::OperationFailed {
                            status: status.to_string(),
                            message: if detail.message.is_empty() {
                                detail.code
                            } else {
                                detail.message
                            },
                        })
                    }
                }
            }
            PollTarget::Location(url) => {
                let response = pipeline.send(Method::GET, url, &[], None).await?;
                if response.status() == StatusCode::ACCEPTED {
                    return Ok(None);
                }
                check_status(response).await?;
                Ok(Some(()))
            }
        }
    })
    .await
}
