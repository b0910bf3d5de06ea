//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use crate::cache::CachedStatusClient;
use crate::domain::{TimeWindowError, TrainNumber, TrainSchedule, TrainStatusResponse};
use crate::stations::{Resolution, StationResolver};
use crate::status::windowed_status;

use super::samples::{sample_schedule, sample_status};

/// Request-handling options.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Substitute sample data when no source has any.
    pub sample_fallback: bool,
    /// Upper bound on time spent resolving one request.
    pub request_budget: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            sample_fallback: true,
            request_budget: Duration::from_secs(30),
        }
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached status aggregator
    pub status: Arc<CachedStatusClient>,

    /// Station name resolver
    pub stations: Arc<StationResolver>,

    pub options: Arc<ServeOptions>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(status: CachedStatusClient, stations: StationResolver, options: ServeOptions) -> Self {
        Self {
            status: Arc::new(status),
            stations: Arc::new(stations),
            options: Arc::new(options),
        }
    }

    /// Live status within the request budget, with sample fallback.
    ///
    /// Running out of budget drops the in-flight lookup and counts as "no
    /// data".
    pub async fn live_status(&self, train: TrainNumber) -> TrainStatusResponse {
        let budget = self.options.request_budget;
        let response = match tokio::time::timeout(budget, self.status.get_live_status(train)).await
        {
            Ok(response) => TrainStatusResponse::clone(&response),
            Err(_) => {
                warn!(train = %train, budget_secs = budget.as_secs(), "status lookup over budget");
                TrainStatusResponse::empty(train)
            }
        };

        if response.is_empty() && self.options.sample_fallback {
            if let Some(sample) = sample_status(train, Local::now().naive_local()) {
                info!(train = %train, "serving sample status");
                return sample;
            }
        }
        response
    }

    /// [`live_status`](Self::live_status) with scraped events limited to
    /// the requested window, if any.
    pub async fn status(
        &self,
        train: TrainNumber,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<TrainStatusResponse, TimeWindowError> {
        windowed_status(start, end, Local::now().naive_local(), self.live_status(train)).await
    }

    /// Schedule within the request budget, with sample fallback.
    pub async fn schedule(&self, train: TrainNumber) -> Option<TrainSchedule> {
        let budget = self.options.request_budget;
        let lookup = self.status.aggregator().get_schedule(train);
        let schedule = tokio::time::timeout(budget, lookup).await.unwrap_or_else(|_| {
            warn!(train = %train, budget_secs = budget.as_secs(), "schedule lookup over budget");
            None
        });

        match schedule {
            Some(schedule) => Some(schedule),
            None if self.options.sample_fallback => sample_schedule(train),
            None => None,
        }
    }

    /// Station resolution within the request budget.
    pub async fn resolve_station(&self, name: &str) -> Option<Resolution> {
        let budget = self.options.request_budget;
        tokio::time::timeout(budget, self.stations.resolve_detailed(name))
            .await
            .unwrap_or_else(|_| {
                warn!(name, budget_secs = budget.as_secs(), "station lookup over budget");
                None
            })
    }
}
