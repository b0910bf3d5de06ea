//! Conversion from backend DTOs to domain types.

use chrono::{NaiveDateTime, NaiveTime};

use crate::domain::{
    EventType, ScheduledStop, StationCode, StatusOrigin, TrainEvent, TrainNumber, TrainSchedule,
    TrainStatusResponse,
};

use super::types::{LiveStatusDto, ScheduleDto, StationLookupDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Payload doesn't carry the fields this conversion needs
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Payload failed to deserialize into the expected shape
    #[error("unexpected payload shape: {0}")]
    Shape(String),
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError::Shape(err.to_string())
    }
}

/// Reshape a live-status payload into a single-event status response.
///
/// The event time is the actual (or else scheduled) arrival at the current
/// station on `now`'s date, falling back to `now` itself.
pub fn convert_live_status(
    dto: &LiveStatusDto,
    train_number: TrainNumber,
    backend: &str,
    now: NaiveDateTime,
) -> Result<TrainStatusResponse, ConversionError> {
    if !dto.has_position() {
        return Err(ConversionError::MissingField("current_station"));
    }

    let station = dto.current_station.clone().unwrap_or_default();
    let station_name = station.name.unwrap_or_else(|| "Unknown".to_string());
    let status = dto.position.clone().unwrap_or_else(|| "Unknown".to_string());

    let event_type = status
        .split_whitespace()
        .next()
        .map(EventType::from_verb)
        .unwrap_or(EventType::Unknown);

    let event_datetime = station
        .actarr
        .as_deref()
        .and_then(parse_hhmm)
        .or_else(|| station.scharr.as_deref().and_then(parse_hhmm))
        .map(|t| now.date().and_time(t))
        .unwrap_or(now);

    let event = TrainEvent {
        raw_text: format!("{status} at {station_name}"),
        event_type,
        station_name,
        station_code: station
            .code
            .as_deref()
            .and_then(|c| StationCode::parse_normalized(c).ok()),
        event_datetime: Some(event_datetime),
        delay: Some(dto.delay_text().unwrap_or_else(|| "0".to_string())),
    };

    Ok(TrainStatusResponse {
        train_number,
        start_date: None,
        last_update: Some(now),
        events: vec![event],
        origin: StatusOrigin::Backend(backend.to_string()),
    })
}

/// First valid station code suggested by a name-to-code lookup.
pub fn first_station_code(dto: &StationLookupDto) -> Option<StationCode> {
    dto.stations
        .iter()
        .find_map(|s| StationCode::parse_normalized(&s.code).ok())
}

/// Reshape a route payload into a schedule.
pub fn convert_schedule(
    dto: &ScheduleDto,
    train_number: TrainNumber,
) -> Result<TrainSchedule, ConversionError> {
    if dto.route.is_empty() && dto.train.is_none() {
        return Err(ConversionError::MissingField("route"));
    }

    let train = dto.train.clone().unwrap_or_default();
    let stops = dto
        .route
        .iter()
        .filter_map(|stop| {
            let code = stop.station.as_ref()?.code()?;
            Some(ScheduledStop {
                station_code: code.to_string(),
                arrival: stop.arrival.clone(),
                departure: stop.departure.clone(),
            })
        })
        .collect();

    Ok(TrainSchedule {
        train_number,
        train_name: train.name,
        from_station: train.from_station.and_then(|s| s.name),
        to_station: train.to_station.and_then(|s| s.name),
        stops,
    })
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}
