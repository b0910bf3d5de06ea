//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::domain::{InvalidTrainNumber, TimeWindowError, TrainNumber, TrainPosition};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations/resolve", get(resolve_station))
        .route("/api/trains/:number/status", get(train_status))
        .route("/api/trains/:number/events", get(train_events))
        .route("/api/trains/:number/position", get(train_position))
        .route("/api/trains/:number/schedule", get(train_schedule))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve a station name to its code.
async fn resolve_station(
    State(state): State<AppState>,
    Query(req): Query<ResolveStationRequest>,
) -> Result<Json<ResolveStationResponse>, AppError> {
    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest {
            message: "missing station name".to_string(),
        })?;

    let resolution = state
        .resolve_station(&name)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("no station code found for {name:?}"),
        })?;

    Ok(Json(ResolveStationResponse::from_resolution(&name, &resolution)))
}

/// Running status, with scraped events limited to the requested window.
///
/// Without `start` or `end` every event is returned.
async fn train_status(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<StatusResult>, AppError> {
    let train = TrainNumber::parse(&number)?;
    let response = state
        .status(train, window.start.as_deref(), window.end.as_deref())
        .await?;
    Ok(Json(StatusResult::from_response(&response)))
}

/// Events only.
async fn train_events(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<EventsResult>, AppError> {
    let train = TrainNumber::parse(&number)?;
    let response = state
        .status(train, window.start.as_deref(), window.end.as_deref())
        .await?;
    Ok(Json(EventsResult {
        train_number: train.value(),
        events: response.events.iter().map(EventResult::from_event).collect(),
    }))
}

/// Current position from the latest event.
async fn train_position(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<PositionResult>, AppError> {
    let train = TrainNumber::parse(&number)?;
    let response = state.live_status(train).await;

    let position = TrainPosition::from_response(&response).ok_or_else(|| AppError::NotFound {
        message: format!("no position known for train {train}"),
    })?;

    Ok(Json(PositionResult::from_position(&position)))
}

/// Timetabled route.
async fn train_schedule(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<ScheduleResult>, AppError> {
    let train = TrainNumber::parse(&number)?;
    let schedule = state
        .schedule(train)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("no schedule found for train {train}"),
        })?;

    Ok(Json(ScheduleResult::from_schedule(&schedule)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<InvalidTrainNumber> for AppError {
    fn from(e: InvalidTrainNumber) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<TimeWindowError> for AppError {
    fn from(e: TimeWindowError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        debug!(%status, %message, "request rejected");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, CachedStatusClient};
    use crate::stations::{StationIndex, StationResolver};
    use crate::status::{RawStatus, SourceError, StatusAggregator, StatusSource};
    use crate::test_support::spawn_stub;
    use crate::web::ServeOptions;
    use chrono::Local;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves a page for one train and fails for every other.
    struct OneTrain {
        train: u32,
        page: String,
    }

    #[async_trait]
    impl StatusSource for OneTrain {
        fn name(&self) -> &str {
            "one-train"
        }

        async fn fetch_raw_status(&self, train: &TrainNumber) -> Result<RawStatus, SourceError> {
            if train.value() == self.train {
                Ok(RawStatus::StatusPage(self.page.clone()))
            } else {
                Err(SourceError::Exhausted)
            }
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl StatusSource for Hanging {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn fetch_raw_status(&self, _train: &TrainNumber) -> Result<RawStatus, SourceError> {
            std::future::pending().await
        }
    }

    fn today_page() -> String {
        let today = Local::now().format("%d-%b-%Y");
        format!(
            "<p>Last Updates On {today} 11:00</p>\n\
             <p>Departed from Ajmer (AII) 06:10 {today}</p>\n\
             <p>Departed from Jaipur (JP) 10:30 {today}</p><p>Delay: (0:20)</p>"
        )
    }

    async fn serve(source: Arc<dyn StatusSource>, options: ServeOptions) -> String {
        let aggregator = StatusAggregator::new(vec![source]);
        let state = AppState::new(
            CachedStatusClient::new(aggregator, &CacheConfig::default()),
            StationResolver::new(Arc::new(StationIndex::builtin())),
            options,
        );
        let addr = spawn_stub(create_router(state)).await;
        format!("http://{addr}")
    }

    async fn default_server() -> String {
        let source = Arc::new(OneTrain {
            train: 12958,
            page: today_page(),
        });
        serve(source, ServeOptions::default()).await
    }

    async fn get(url: String) -> (u16, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health() {
        let base = default_server().await;
        let body = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn status_and_events() {
        let base = default_server().await;

        let (status, body) = get(format!("{base}/api/trains/12958/status")).await;
        assert_eq!(status, 200);
        assert_eq!(body["source"], "ntes");
        assert_eq!(body["events"].as_array().unwrap().len(), 2);
        assert_eq!(body["events"][1]["station_code"], "JP");
        assert_eq!(body["events"][1]["delay_minutes"], 20);

        let (status, body) =
            get(format!("{base}/api/trains/12958/events?start=06:00&end=07:00")).await;
        assert_eq!(status, 200);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["station_name"], "Ajmer");
        assert_eq!(events[0]["event_type"], "Departed");
    }

    fn overnight_page() -> String {
        let now = Local::now();
        let yesterday = (now - chrono::Duration::days(1)).format("%d-%b-%Y");
        let today = now.format("%d-%b-%Y");
        format!(
            "<p>Last Updates On {today} 00:30</p>\n\
             <p>Departed from New Delhi (NDLS) 16:55 {yesterday}</p>\n\
             <p>Arrived at Kota Jn (KOTA) 23:50 {yesterday}</p>\n\
             <p>Departed from Vadodara (BRC) 00:15 {today}</p>"
        )
    }

    #[tokio::test]
    async fn unbounded_requests_return_every_event() {
        let base = serve(
            Arc::new(OneTrain {
                train: 12951,
                page: overnight_page(),
            }),
            ServeOptions::default(),
        )
        .await;

        let (status, body) = get(format!("{base}/api/trains/12951/events")).await;
        assert_eq!(status, 200);
        let stations: Vec<_> = body["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["station_name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(stations, vec!["New Delhi", "Kota Jn", "Vadodara"]);

        let (status, body) = get(format!("{base}/api/trains/12951/status?start=&end=")).await;
        assert_eq!(status, 200);
        assert_eq!(body["events"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn bad_input_is_400() {
        let base = default_server().await;

        let (status, body) = get(format!("{base}/api/trains/123/status")).await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("5-digit"));

        let (status, _) = get(format!("{base}/api/trains/12958/events?start=noon")).await;
        assert_eq!(status, 400);

        let (status, _) = get(format!("{base}/api/stations/resolve?name=%20")).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn position() {
        let base = default_server().await;
        let (status, body) = get(format!("{base}/api/trains/12958/position")).await;
        assert_eq!(status, 200);
        assert_eq!(body["station"], "Jaipur");
        assert_eq!(body["status"], "Late by 20 mins");
        assert_eq!(body["last_event"], "Departed");

        let (status, _) = get(format!("{base}/api/trains/11111/position")).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn samples_fill_in_for_missing_data() {
        let base = default_server().await;

        let (status, body) = get(format!("{base}/api/trains/12302/status")).await;
        assert_eq!(status, 200);
        assert_eq!(body["source"], "sample");
        assert_eq!(body["events"][0]["station_name"], "Ambala");

        let (status, body) = get(format!("{base}/api/trains/12301/schedule")).await;
        assert_eq!(status, 200);
        assert_eq!(body["train_name"], "Rajdhani Express");

        let (status, _) = get(format!("{base}/api/trains/11111/schedule")).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn without_samples_missing_data_is_empty() {
        let options = ServeOptions {
            sample_fallback: false,
            ..ServeOptions::default()
        };
        let base = serve(
            Arc::new(OneTrain {
                train: 12958,
                page: today_page(),
            }),
            options,
        )
        .await;

        let (status, body) = get(format!("{base}/api/trains/12302/status")).await;
        assert_eq!(status, 200);
        assert_eq!(body["source"], "none");
        assert!(body["events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_budget_cuts_off_hanging_sources() {
        let options = ServeOptions {
            sample_fallback: false,
            request_budget: Duration::from_millis(200),
        };
        let base = serve(Arc::new(Hanging), options).await;

        let (status, body) = get(format!("{base}/api/trains/12958/status")).await;
        assert_eq!(status, 200);
        assert_eq!(body["source"], "none");
    }

    #[tokio::test]
    async fn resolves_stations() {
        let base = default_server().await;

        let (status, body) = get(format!("{base}/api/stations/resolve?name=New%20Delhi")).await;
        assert_eq!(status, 200);
        assert_eq!(body["code"], "NDLS");
        assert_eq!(body["matched_by"], "exact");

        let (status, body) = get(format!("{base}/api/stations/resolve?name=jhodpur")).await;
        assert_eq!(status, 200);
        assert_eq!(body["code"], "JU");
        assert_eq!(body["matched_by"], "fuzzy");

        let (status, _) = get(format!("{base}/api/stations/resolve?name=xyzzyq")).await;
        assert_eq!(status, 404);
    }
}
