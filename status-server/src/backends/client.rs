//! Multi-backend HTTP request executor.
//!
//! Issues GET requests against the active backend and rotates through the
//! registry when a backend fails. Failures never propagate: after the last
//! attempt the executor reports "no data".

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::BackendError;
use super::registry::{AuthStyle, BackendRegistry, BackendSource};

/// Placeholder in path templates replaced by the source credential.
pub const APIKEY_PLACEHOLDER: &str = "{apikey}";

/// Value substituted for the placeholder when a source has no URL credential.
const DEMO_KEY: &str = "demo_key";

/// Configuration for the request executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per request when callers don't choose
    pub max_retries: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
        }
    }
}

impl ExecutorConfig {
    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the default number of attempts.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }
}

/// A successful backend payload and the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub backend: String,
    pub body: Value,
}

/// Executes requests against whichever backend is active.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http: reqwest::Client,
    registry: Arc<BackendRegistry>,
    max_retries: u32,
}

impl RequestExecutor {
    /// Create an executor over a shared registry.
    ///
    /// Certificate validation is disabled: the Indian Railways backends are
    /// known to serve expired or mismatched certificates, and a relaxed
    /// check is the only way to reach them. Nothing sensitive beyond the
    /// API keys travels over these connections.
    pub fn new(registry: Arc<BackendRegistry>, config: ExecutorConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            http,
            registry,
            max_retries: config.max_retries,
        })
    }

    /// The registry this executor rotates through.
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Execute with the configured default number of attempts.
    pub async fn execute_default(&self, path_template: &str) -> Option<BackendResponse> {
        self.execute(path_template, self.max_retries).await
    }

    /// GET `path_template` from the active backend, retrying up to
    /// `max_retries` attempts in total.
    ///
    /// Every failed attempt except the last advances the registry, so the
    /// next attempt goes to the next backend. Returns `None` once all
    /// attempts have failed.
    pub async fn execute(&self, path_template: &str, max_retries: u32) -> Option<BackendResponse> {
        for attempt in 1..=max_retries {
            let source = self.registry.current();

            match self.attempt(&source, path_template).await {
                Ok(body) => {
                    debug!(backend = %source.name, attempt, "backend request succeeded");
                    return Some(BackendResponse {
                        backend: source.name,
                        body,
                    });
                }
                Err(e) if e.is_transient() => {
                    debug!(backend = %source.name, attempt, error = %e, "backend unreachable");
                }
                Err(e) => {
                    warn!(backend = %source.name, attempt, error = %e, "backend request failed");
                }
            }

            if attempt < max_retries {
                self.registry.advance();
            }
        }

        None
    }

    async fn attempt(&self, source: &BackendSource, path_template: &str) -> Result<Value, BackendError> {
        let url = build_url(source, path_template);

        let mut request = self.http.get(&url);
        if let AuthStyle::Headers { key, host } = source.auth_style() {
            request = request
                .header("x-rapidapi-key", key)
                .header("x-rapidapi-host", host);
        }

        let response = request.send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        if indicates_success(&value) {
            Ok(value)
        } else {
            Err(BackendError::Unsuccessful)
        }
    }
}

/// Join a source's base URL and a path template, filling in the credential.
pub fn build_url(source: &BackendSource, path_template: &str) -> String {
    let key = match source.auth_style() {
        AuthStyle::UrlKey(key) => key,
        _ => DEMO_KEY,
    };
    format!(
        "{}{}",
        source.base_url.trim_end_matches('/'),
        path_template.replace(APIKEY_PLACEHOLDER, key)
    )
}

/// Whether a parsed body counts as a successful response.
///
/// The backends disagree on how they report success: some send a
/// `response_code`, some a `status` string, some just the data object.
fn indicates_success(value: &Value) -> bool {
    value.get("response_code").and_then(Value::as_i64) == Some(200)
        || value.get("status").and_then(Value::as_str) == Some("success")
        || value.is_object()
}
