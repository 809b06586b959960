// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SLM agent API client.
//!
//! Handles:
//! - Full agent listing (used for credential matching)
//! - Per-agent detail (used to refresh the role)

use crate::error::AppError;
use crate::models::{RemoteUser, RemoteUserDetail};
use serde::Deserialize;
use std::time::Duration;

/// Agent API client.
#[derive(Clone)]
pub struct AgentApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentApiClient {
    /// Create a new client. `timeout` bounds every request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every agent account.
    pub async fn list_users(&self) -> Result<Vec<RemoteUser>, AppError> {
        let url = format!("{}/users", self.base_url);
        self.get_json(&url).await
    }

    /// Get one agent's detail record (includes the role).
    pub async fn get_user_detail(&self, user_id: u64) -> Result<RemoteUserDetail, AppError> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        self.get_json(&url).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, AppError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::AgentApi(format!("Request timed out: {}", url))
            } else {
                AppError::AgentApi(e.to_string())
            }
        })?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AgentApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AgentApi(format!("JSON parse error: {}", e)))
    }
}
