//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ScheduledStop, TrainEvent, TrainPosition, TrainSchedule, TrainStatusResponse,
};
use crate::stations::Resolution;

/// Datetimes are rendered as local ISO 8601 without an offset.
fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Optional window bounds for status and event queries.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    /// "HH:MM[:SS]" or an ISO datetime
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Request to resolve a station name.
#[derive(Debug, Deserialize)]
pub struct ResolveStationRequest {
    pub name: Option<String>,
}

/// A resolved station.
#[derive(Debug, Serialize)]
pub struct ResolveStationResponse {
    pub name: String,
    pub code: String,
    /// exact, substring, fuzzy, or backend
    pub matched_by: &'static str,
}

impl ResolveStationResponse {
    pub fn from_resolution(name: &str, resolution: &Resolution) -> Self {
        Self {
            name: name.trim().to_string(),
            code: resolution.code.as_str().to_string(),
            matched_by: resolution.kind.as_str(),
        }
    }
}

/// One status event.
#[derive(Debug, Serialize)]
pub struct EventResult {
    pub raw_text: String,
    /// "Arrived", "Departed" or "Status"
    pub event_type: &'static str,
    pub station_name: String,
    pub station_code: Option<String>,
    pub event_datetime: Option<String>,
    pub delay: Option<String>,
    pub delay_minutes: Option<i64>,
}

impl EventResult {
    pub fn from_event(event: &TrainEvent) -> Self {
        Self {
            raw_text: event.raw_text.clone(),
            event_type: event.event_type.as_str(),
            station_name: event.station_name.clone(),
            station_code: event.station_code.as_ref().map(|c| c.as_str().to_string()),
            event_datetime: event.event_datetime.map(format_datetime),
            delay: event.delay.clone(),
            delay_minutes: event.delay_minutes(),
        }
    }
}

/// A train's running status.
#[derive(Debug, Serialize)]
pub struct StatusResult {
    pub train_number: u32,
    pub start_date: Option<String>,
    pub last_update: Option<String>,
    /// ntes, a backend name, sample, or none
    pub source: String,
    pub events: Vec<EventResult>,
}

impl StatusResult {
    pub fn from_response(response: &TrainStatusResponse) -> Self {
        Self {
            train_number: response.train_number.value(),
            start_date: response.start_date.clone(),
            last_update: response.last_update.map(format_datetime),
            source: response.origin.label().to_string(),
            events: response.events.iter().map(EventResult::from_event).collect(),
        }
    }
}

/// Just the events of a status.
#[derive(Debug, Serialize)]
pub struct EventsResult {
    pub train_number: u32,
    pub events: Vec<EventResult>,
}

/// Where a train is now.
#[derive(Debug, Serialize)]
pub struct PositionResult {
    pub train_number: u32,
    pub station: String,
    pub last_event: &'static str,
    pub event_time: Option<String>,
    pub delay_minutes: i64,
    /// e.g. "Late by 15 mins"
    pub status: String,
    pub last_update: Option<String>,
    pub raw_status: String,
}

impl PositionResult {
    pub fn from_position(position: &TrainPosition) -> Self {
        Self {
            train_number: position.train_number.value(),
            station: position.station.clone(),
            last_event: position.last_event.as_str(),
            event_time: position.event_time.map(format_datetime),
            delay_minutes: position.delay_minutes,
            status: position.status_label(),
            last_update: position.last_update.map(format_datetime),
            raw_status: position.raw_status.clone(),
        }
    }
}

/// A stop in a schedule.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub station_code: String,
    pub arrival: Option<String>,
    pub departure: Option<String>,
}

/// A train's timetabled route.
#[derive(Debug, Serialize)]
pub struct ScheduleResult {
    pub train_number: u32,
    pub train_name: Option<String>,
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub stops: Vec<StopResult>,
}

impl ScheduleResult {
    pub fn from_schedule(schedule: &TrainSchedule) -> Self {
        let stop = |s: &ScheduledStop| StopResult {
            station_code: s.station_code.clone(),
            arrival: s.arrival.clone(),
            departure: s.departure.clone(),
        };
        Self {
            train_number: schedule.train_number.value(),
            train_name: schedule.train_name.clone(),
            from_station: schedule.from_station.clone(),
            to_station: schedule.to_station.clone(),
            stops: schedule.stops.iter().map(stop).collect(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
