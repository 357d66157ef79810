//! HTTP transport to the configuration backend (FastAPI, http://localhost:1013 by default).
//! One call = one round trip; failures are normalized into [`SyncError`].

use crate::backend::error::SyncError;
use crate::config::{self, Config, DEFAULT_BACKEND_URL};
use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Client for the configuration backend.
///
/// Cheap to clone. A clone made with [`BackendClient::with_cancellation`] aborts its in-flight
/// request when the token fires.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
    cancel: Option<CancellationToken>,
}

impl BackendClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
            cancel: None,
        }
    }

    /// Build from app config. `override_url` wins over env and config file (see [`config::resolve_backend_url`]).
    pub fn from_config(config: &Config, override_url: Option<&str>) -> Result<Self> {
        let base_url = config::resolve_backend_url(config, override_url);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.backend.timeout_secs.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("building HTTP client")?;
        Ok(Self {
            base_url,
            client,
            cancel: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same client, bound to `token`. Requests issued through the returned client resolve to
    /// [`SyncError::Cancelled`] once the token is cancelled; the underlying request is dropped.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Value, SyncError> {
        let req = self
            .client
            .get(self.url(path))
            .header(CONTENT_TYPE, "application/json");
        self.send(Method::GET, path, req).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, SyncError> {
        let req = self.client.post(self.url(path)).json(body);
        self.send(Method::POST, path, req).await
    }

    /// POST with query parameters only, no body.
    pub(crate) async fn post_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, SyncError> {
        let req = self
            .client
            .post(self.url(path))
            .query(query)
            .header(CONTENT_TYPE, "application/json");
        self.send(Method::POST, path, req).await
    }

    async fn send(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Value, SyncError> {
        log::debug!("{} {}{}", method, self.base_url, path);
        let result = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(SyncError::Cancelled),
                    r = execute(req) => r,
                }
            }
            None => execute(req).await,
        };
        if let Err(ref e) = result {
            log::warn!("{} {} failed: {}", method, path, e);
        }
        result
    }
}

async fn execute(req: RequestBuilder) -> Result<Value, SyncError> {
    let res = req.send().await.map_err(SyncError::network)?;
    let status = res.status();
    let text = res.text().await.map_err(SyncError::network)?;
    if !status.is_success() {
        return Err(http_error(status.as_u16(), &text));
    }
    serde_json::from_str(&text).map_err(SyncError::network)
}

/// Error for a non-2xx response: `error`/`details` from a JSON body when present, else `HTTP <status>`.
pub(crate) fn http_error(status: u16, body: &str) -> SyncError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |key: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let error = field("error").unwrap_or_else(|| format!("HTTP {}", status));
    // FastAPI's HTTPException reports under `detail`.
    let details = field("details").or_else(|| field("detail"));
    SyncError::Http {
        status,
        error,
        details,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, SyncError> {
    serde_json::from_value(value).map_err(|e| SyncError::Decode(e.to_string()))
}
