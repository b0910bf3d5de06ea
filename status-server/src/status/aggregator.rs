//! The status degradation chain.
//!
//! Sources are tried strictly in order. The first that yields a usable
//! status wins; if none does, the result is an explicitly empty response
//! rather than an error, so callers can tell "no data anywhere" apart from
//! bad input.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::backends::{
    ConversionError, LiveStatusDto, RequestExecutor, ScheduleDto, convert_live_status,
    convert_schedule,
};
use crate::domain::{
    StatusOrigin, TimeWindow, TimeWindowError, TrainEvent, TrainNumber, TrainPosition,
    TrainSchedule, TrainStatusResponse,
};
use crate::ntes::parse_status_page;

use super::source::{RawStatus, SourceError, StatusSource};

/// Resolves running status from an ordered list of sources.
#[derive(Clone)]
pub struct StatusAggregator {
    sources: Vec<Arc<dyn StatusSource>>,
    schedules: Option<RequestExecutor>,
}

impl StatusAggregator {
    /// Create an aggregator trying `sources` in the given order.
    pub fn new(sources: Vec<Arc<dyn StatusSource>>) -> Self {
        Self {
            sources,
            schedules: None,
        }
    }

    /// Use `executor` for schedule lookups.
    pub fn with_schedules(mut self, executor: RequestExecutor) -> Self {
        self.schedules = Some(executor);
        self
    }

    /// Latest running status, unfiltered. Never fails.
    pub async fn get_live_status(&self, train: TrainNumber) -> TrainStatusResponse {
        self.live_status_at(train, Local::now().naive_local()).await
    }

    /// Running status, with scraped events limited to the window `start`
    /// and `end` describe. See [`windowed_status`].
    pub async fn get_status(
        &self,
        train: TrainNumber,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<TrainStatusResponse, TimeWindowError> {
        self.status_at(train, start, end, Local::now().naive_local())
            .await
    }

    /// Just the events of [`get_status`](Self::get_status).
    pub async fn get_events(
        &self,
        train: TrainNumber,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<TrainEvent>, TimeWindowError> {
        Ok(self.get_status(train, start, end).await?.events)
    }

    /// Where the train is now, if any source knows.
    pub async fn current_position(&self, train: TrainNumber) -> Option<TrainPosition> {
        TrainPosition::from_response(&self.get_live_status(train).await)
    }

    /// The train's timetabled route from the generic backends.
    pub async fn get_schedule(&self, train: TrainNumber) -> Option<TrainSchedule> {
        let executor = self.schedules.as_ref()?;
        let path = format!("/route/train/{train}/apikey/{{apikey}}/");
        let response = executor.execute_default(&path).await?;

        let schedule = serde_json::from_value::<ScheduleDto>(response.body)
            .map_err(ConversionError::from)
            .and_then(|dto| convert_schedule(&dto, train));

        match schedule {
            Ok(schedule) => Some(schedule),
            Err(e) => {
                warn!(
                    train = %train,
                    backend = %response.backend,
                    error = %e,
                    "unusable schedule payload"
                );
                None
            }
        }
    }

    async fn status_at(
        &self,
        train: TrainNumber,
        start: Option<&str>,
        end: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<TrainStatusResponse, TimeWindowError> {
        windowed_status(start, end, now, self.live_status_at(train, now)).await
    }

    async fn live_status_at(&self, train: TrainNumber, now: NaiveDateTime) -> TrainStatusResponse {
        for source in &self.sources {
            let outcome = match source.fetch_raw_status(&train).await {
                Ok(raw) => interpret(raw, train, now),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(response) => {
                    debug!(
                        train = %train,
                        source = source.name(),
                        events = response.events.len(),
                        "status resolved"
                    );
                    return response;
                }
                Err(e) => {
                    info!(train = %train, source = source.name(), error = %e, "status source failed");
                }
            }
        }

        warn!(train = %train, "no status source had data");
        TrainStatusResponse::empty(train)
    }
}

/// Await `lookup` and keep only the scraped events inside the window
/// `start` and `end` describe (see [`TimeWindow::requested_at`]).
///
/// Without bounds every event is kept. Bad bounds fail before `lookup` is
/// ever polled, so no network call is made for them.
pub async fn windowed_status(
    start: Option<&str>,
    end: Option<&str>,
    now: NaiveDateTime,
    lookup: impl Future<Output = TrainStatusResponse>,
) -> Result<TrainStatusResponse, TimeWindowError> {
    let window = TimeWindow::requested_at(start, end, now)?;
    let response = lookup.await;
    Ok(match window {
        Some(window) => response.filtered(&window),
        None => response,
    })
}

/// Turn a source's raw output into the canonical response.
fn interpret(
    raw: RawStatus,
    train: TrainNumber,
    now: NaiveDateTime,
) -> Result<TrainStatusResponse, SourceError> {
    match raw {
        RawStatus::StatusPage(html) => {
            let parsed = parse_status_page(&html, now.date());
            if parsed.raw_status.is_empty() {
                return Err(SourceError::Unrecognized(
                    "page has no running-status lines".to_string(),
                ));
            }
            Ok(TrainStatusResponse {
                train_number: train,
                start_date: parsed.start_date,
                last_update: parsed.last_update,
                events: parsed.events,
                origin: StatusOrigin::Ntes,
            })
        }
        RawStatus::LiveJson { backend, body } => {
            let dto: LiveStatusDto = serde_json::from_value(body)
                .map_err(|e| SourceError::Unrecognized(e.to_string()))?;
            Ok(convert_live_status(&dto, train, &backend, now)?)
        }
    }
}
