// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::bonds::BondsApi;
use super::issuance_costs::IssuanceCostsApi;
use super::projection::ProjectionsApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, Operation};

const UA: &str = concat!(
    "bondclip/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/bondclip)"
);

/// HTTP client for the bond service.
///
/// Cloning is cheap: clones share the underlying connection pool. An
/// authenticated client adds `Authorization: Bearer <token>` to every request
/// it builds; both flavours send `Content-Type: application/json`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn unauthenticated(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(UA)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn authenticated(
        base_url: &str,
        timeout: Duration,
        token: impl Into<String>,
    ) -> reqwest::Result<Self> {
        let mut client = Self::unauthenticated(base_url, timeout)?;
        client.token = Some(token.into());
        Ok(client)
    }

    pub fn from_config(cfg: &ClientConfig) -> reqwest::Result<Self> {
        match &cfg.token {
            Some(token) => Self::authenticated(&cfg.base_url, cfg.timeout(), token.clone()),
            None => Self::unauthenticated(&cfg.base_url, cfg.timeout()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn bonds(&self) -> BondsApi<'_> {
        BondsApi::new(self)
    }

    pub fn issuance_costs(&self) -> IssuanceCostsApi<'_> {
        IssuanceCostsApi::new(self)
    }

    pub fn projections(&self) -> ProjectionsApi<'_> {
        ProjectionsApi::new(self)
    }

    /// Builds a request for `path`, injecting the bearer token when present.
    /// A token that is not a valid header value fails at send time.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn execute(&self, op: Operation, rb: RequestBuilder) -> Result<Response, ApiError> {
        let resp = rb
            .send()
            .await
            .map_err(|e| ApiError::from_transport(op, e))?;
        let status = resp.status();
        debug!(operation = %op, status = status.as_u16(), "bond service answered");
        if status.is_success() {
            return Ok(resp);
        }
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    operation = %op,
                    status = status.as_u16(),
                    error = %e,
                    "could not read error body, using the default message"
                );
                String::new()
            }
        };
        Err(ApiError::from_response(op, status, &body))
    }

    /// Runs a request whose answer body is not needed; only the status is logged.
    pub(crate) async fn call(&self, op: Operation, rb: RequestBuilder) -> Result<StatusCode, ApiError> {
        let status = self.execute(op, rb).await?.status();
        info!(operation = %op, status = status.as_u16(), "request completed");
        Ok(status)
    }

    pub(crate) async fn call_json<T>(&self, op: Operation, rb: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.execute(op, rb)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::from_transport(op, e))
    }
}
