//! Generic backend response DTOs.
//!
//! The backends in the registry share a loose family of JSON shapes. These
//! types use `Option` and `#[serde(default)]` throughout because each
//! backend omits a different subset of fields.

use serde::Deserialize;
use serde_json::Value;

/// Train identity as reported by the backends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrainDto {
    pub name: Option<String>,
    /// Sent as a string by some backends and a number by others.
    pub number: Option<Value>,
}

/// The station a train was last reported at.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentStationDto {
    pub name: Option<String>,
    pub code: Option<String>,
    /// Scheduled arrival, "HH:MM".
    pub scharr: Option<String>,
    /// Actual arrival, "HH:MM".
    pub actarr: Option<String>,
}

/// Response from the `/live/train/...` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiveStatusDto {
    pub response_code: Option<i64>,
    pub train: Option<TrainDto>,
    pub current_station: Option<CurrentStationDto>,
    /// Free-text running status, e.g. "Running 15 mins late".
    pub position: Option<String>,
    /// Minutes late; a number or a numeric string.
    pub delay: Option<Value>,
}

impl LiveStatusDto {
    /// The delay as text, whatever JSON type the backend used.
    pub fn delay_text(&self) -> Option<String> {
        match self.delay.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Whether the payload says anything about where the train is.
    pub fn has_position(&self) -> bool {
        self.current_station
            .as_ref()
            .is_some_and(|s| s.name.is_some())
            || self.position.is_some()
    }
}

/// One suggestion from the `/name-to-code/...` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StationSuggestionDto {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response from the `/name-to-code/...` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StationLookupDto {
    pub stations: Vec<StationSuggestionDto>,
}

/// A named station reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamedStationDto {
    pub code: Option<String>,
    pub name: Option<String>,
}

/// A route stop's station: either a bare code or a nested object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RouteStationDto {
    Code(String),
    Named(NamedStationDto),
}

impl RouteStationDto {
    pub fn code(&self) -> Option<&str> {
        match self {
            RouteStationDto::Code(code) => Some(code),
            RouteStationDto::Named(named) => named.code.as_deref(),
        }
    }
}

/// One stop in a `/route/train/...` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteStopDto {
    pub station: Option<RouteStationDto>,
    #[serde(alias = "scharr")]
    pub arrival: Option<String>,
    #[serde(alias = "schdep")]
    pub departure: Option<String>,
}

/// Train identity plus its end points, as sent with routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteTrainDto {
    pub name: Option<String>,
    pub number: Option<Value>,
    pub from_station: Option<NamedStationDto>,
    pub to_station: Option<NamedStationDto>,
}

/// Response from the `/route/train/...` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleDto {
    pub train: Option<RouteTrainDto>,
    pub route: Vec<RouteStopDto>,
}
