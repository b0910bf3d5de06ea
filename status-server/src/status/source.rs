//! Raw status sources.
//!
//! Each source knows how to fetch *something* about a train's running
//! status; the aggregator knows how to interpret what comes back.

use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use tracing::debug;

use crate::backends::{ConversionError, RequestExecutor};
use crate::domain::TrainNumber;
use crate::ntes::{NtesClient, ScrapeError};

/// Uninterpreted output of a status source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawStatus {
    /// An NTES running-status page.
    StatusPage(String),
    /// A live-status payload from a generic backend.
    LiveJson { backend: String, body: Value },
}

/// Why a source produced no usable status.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Every backend attempt failed
    #[error("no backend returned data")]
    Exhausted,

    /// A payload arrived but carried nothing recognizable
    #[error("unrecognized status payload: {0}")]
    Unrecognized(String),
}

impl From<ConversionError> for SourceError {
    fn from(err: ConversionError) -> Self {
        SourceError::Unrecognized(err.to_string())
    }
}

/// Something that can fetch a train's raw running status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    async fn fetch_raw_status(&self, train: &TrainNumber) -> Result<RawStatus, SourceError>;
}

/// Scrapes today's run from the NTES enquiry site.
///
/// Each fetch opens its own session and drops it when done.
#[derive(Debug, Clone)]
pub struct NtesSource {
    client: NtesClient,
}

impl NtesSource {
    pub fn new(client: NtesClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for NtesSource {
    fn name(&self) -> &str {
        "ntes"
    }

    async fn fetch_raw_status(&self, train: &TrainNumber) -> Result<RawStatus, SourceError> {
        let session = self.client.session().await?;
        let html = session
            .fetch_running_status(train, Local::now().date_naive())
            .await?;
        Ok(RawStatus::StatusPage(html))
    }
}

/// Asks the generic backends for today's live status.
#[derive(Debug, Clone)]
pub struct BackendLiveSource {
    executor: RequestExecutor,
}

impl BackendLiveSource {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }
}

/// Live-status path for a train's run today.
fn live_status_path(train: &TrainNumber) -> String {
    format!(
        "/live/train/{train}/date/{}/apikey/{{apikey}}/",
        Local::now().format("%d-%m-%Y")
    )
}

#[async_trait]
impl StatusSource for BackendLiveSource {
    fn name(&self) -> &str {
        "backends"
    }

    async fn fetch_raw_status(&self, train: &TrainNumber) -> Result<RawStatus, SourceError> {
        let path = live_status_path(train);
        let response = self
            .executor
            .execute_default(&path)
            .await
            .ok_or(SourceError::Exhausted)?;
        debug!(train = %train, backend = %response.backend, "live status from backend");
        Ok(RawStatus::LiveJson {
            backend: response.backend,
            body: response.body,
        })
    }
}
