//! Canonical running-status records.
//!
//! Every data source (scraped NTES pages, generic backend JSON) is
//! normalized into these types before it leaves the engine.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;

use super::{StationCode, TimeWindow, TrainNumber};

/// What happened at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Arrival,
    Departure,
    /// Status reported without a recognizable arrival/departure verb.
    Unknown,
}

impl EventType {
    /// Map the verb used on status pages ("Arrived", "departed") to a type.
    pub fn from_verb(verb: &str) -> Self {
        match verb.to_ascii_lowercase().as_str() {
            "arrived" | "arrive" | "arriving" => EventType::Arrival,
            "departed" | "depart" | "departure" => EventType::Departure,
            _ => EventType::Unknown,
        }
    }

    /// Past-tense label as shown on status pages.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Arrival => "Arrived",
            EventType::Departure => "Departed",
            EventType::Unknown => "Status",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single arrival/departure observation for a train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainEvent {
    /// The source line this event was extracted from.
    pub raw_text: String,
    pub event_type: EventType,
    pub station_name: String,
    pub station_code: Option<StationCode>,
    /// Always a full calendar datetime when present.
    pub event_datetime: Option<NaiveDateTime>,
    /// Delay as reported, e.g. "0:15" or "15".
    pub delay: Option<String>,
}

impl TrainEvent {
    /// Key used to drop duplicate observations.
    fn dedup_key(&self) -> (EventType, String, Option<NaiveDateTime>) {
        (self.event_type, self.station_name.clone(), self.event_datetime)
    }

    /// The reported delay converted to minutes.
    ///
    /// Returns `None` when no delay was reported or it can't be read.
    pub fn delay_minutes(&self) -> Option<i64> {
        self.delay.as_deref().and_then(delay_minutes)
    }
}

/// Convert a reported delay ("H:MM" or plain minutes) to minutes.
///
/// Values too large to represent count as unreadable.
/// # Examples
///
/// ```
/// use status_server::domain::delay_minutes;
///
/// assert_eq!(delay_minutes("1:05"), Some(65));
/// assert_eq!(delay_minutes("15"), Some(15));
/// assert_eq!(delay_minutes("late"), None);
/// ```
pub fn delay_minutes(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    match raw.split_once(':') {
        Some((hours, minutes)) => {
            let hours: i64 = hours.trim().parse().ok()?;
            let minutes: i64 = minutes.trim().parse().ok()?;
            hours.checked_mul(60)?.checked_add(minutes)
        }
        None => raw.parse().ok(),
    }
}

/// Remove events with the same (type, station, datetime), keeping the first.
pub fn dedup_events(events: Vec<TrainEvent>) -> Vec<TrainEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|e| seen.insert(e.dedup_key()))
        .collect()
}

/// Which tier of the degradation chain produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOrigin {
    /// Scraped from the NTES enquiry site.
    Ntes,
    /// A generic backend API, by registry name.
    Backend(String),
    /// Static sample data, substituted by the caller when every source failed.
    Sample,
    /// Every source failed; the response carries no events.
    None,
}

impl StatusOrigin {
    /// Short label for logs and responses.
    pub fn label(&self) -> &str {
        match self {
            StatusOrigin::Ntes => "ntes",
            StatusOrigin::Backend(name) => name,
            StatusOrigin::Sample => "sample",
            StatusOrigin::None => "none",
        }
    }
}

/// The canonical status record for one train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainStatusResponse {
    pub train_number: TrainNumber,
    /// Journey start date as printed by the source (e.g. "05-Jan-2024").
    pub start_date: Option<String>,
    pub last_update: Option<NaiveDateTime>,
    pub events: Vec<TrainEvent>,
    pub origin: StatusOrigin,
}

impl TrainStatusResponse {
    /// An explicitly empty response: no source had data.
    pub fn empty(train_number: TrainNumber) -> Self {
        Self {
            train_number,
            start_date: None,
            last_update: None,
            events: Vec::new(),
            origin: StatusOrigin::None,
        }
    }

    /// Whether any source produced data.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Keep only events inside `window`.
    ///
    /// Only scraped events carry reliable times, so responses from other
    /// origins are returned unchanged. Events without a datetime are dropped.
    pub fn filtered(mut self, window: &TimeWindow) -> Self {
        if self.origin == StatusOrigin::Ntes {
            self.events
                .retain(|e| e.event_datetime.is_some_and(|dt| window.contains(dt)));
        }
        self
    }

    /// The most recent event, by datetime.
    ///
    /// Events without a datetime sort before all dated events; among equal
    /// times the earliest in the list wins.
    pub fn latest_event(&self) -> Option<&TrainEvent> {
        self.events
            .iter()
            .reduce(|best, e| if e.event_datetime > best.event_datetime { e } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn event(event_type: EventType, station: &str, dt: Option<NaiveDateTime>) -> TrainEvent {
        TrainEvent {
            raw_text: format!("{event_type} {station}"),
            event_type,
            station_name: station.to_string(),
            station_code: None,
            event_datetime: dt,
            delay: None,
        }
    }

    fn train() -> TrainNumber {
        TrainNumber::parse("12301").unwrap()
    }

    #[test]
    fn event_type_from_verb() {
        assert_eq!(EventType::from_verb("Departed"), EventType::Departure);
        assert_eq!(EventType::from_verb("ARRIVED"), EventType::Arrival);
        assert_eq!(EventType::from_verb("Running"), EventType::Unknown);
    }

    #[test]
    fn delay_parsing() {
        assert_eq!(delay_minutes("0:15"), Some(15));
        assert_eq!(delay_minutes("2:00"), Some(120));
        assert_eq!(delay_minutes(" 7 "), Some(7));
        assert_eq!(delay_minutes(""), None);
        assert_eq!(delay_minutes("1:xx"), None);
    }

    #[test]
    fn oversized_delay_is_unreadable() {
        assert_eq!(delay_minutes("9223372036854775807:00"), None);
        assert_eq!(delay_minutes("153722867280912930:59"), None);
        assert_eq!(delay_minutes("99999999999999999999"), None);

        let event = TrainEvent {
            delay: Some("9223372036854775807:00".into()),
            ..event(EventType::Arrival, "Kota", None)
        };
        assert_eq!(event.delay_minutes(), None);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut first = event(EventType::Departure, "Jaipur", Some(at(10, 30)));
        first.raw_text = "first".into();
        let mut second = first.clone();
        second.raw_text = "second".into();
        let other = event(EventType::Arrival, "Jaipur", Some(at(10, 20)));

        let events = dedup_events(vec![first, other, second]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].raw_text, "first");
        assert_eq!(events[1].event_type, EventType::Arrival);
    }

    #[test]
    fn filter_only_applies_to_scraped_events() {
        let window = TimeWindow::new(at(10, 0), at(11, 0));
        let events = vec![
            event(EventType::Arrival, "Ajmer", Some(at(9, 0))),
            event(EventType::Departure, "Jaipur", Some(at(10, 30))),
            event(EventType::Arrival, "Kota", None),
        ];

        let scraped = TrainStatusResponse {
            events: events.clone(),
            origin: StatusOrigin::Ntes,
            ..TrainStatusResponse::empty(train())
        };
        let filtered = scraped.filtered(&window);
        assert_eq!(filtered.events.len(), 1);
        assert_eq!(filtered.events[0].station_name, "Jaipur");

        let backend = TrainStatusResponse {
            events,
            origin: StatusOrigin::Backend("railwayapi".into()),
            ..TrainStatusResponse::empty(train())
        };
        assert_eq!(backend.filtered(&window).events.len(), 3);
    }

    #[test]
    fn latest_event_prefers_dated_events() {
        let response = TrainStatusResponse {
            events: vec![
                event(EventType::Departure, "Jaipur", Some(at(10, 30))),
                event(EventType::Arrival, "Kota", None),
                event(EventType::Arrival, "Ajmer", Some(at(8, 0))),
            ],
            origin: StatusOrigin::Ntes,
            ..TrainStatusResponse::empty(train())
        };
        assert_eq!(response.latest_event().unwrap().station_name, "Jaipur");
    }

    #[test]
    fn latest_event_tie_keeps_first() {
        let response = TrainStatusResponse {
            events: vec![
                event(EventType::Arrival, "Kota", Some(at(10, 30))),
                event(EventType::Departure, "Kota", Some(at(10, 30))),
                event(EventType::Arrival, "Bina", None),
            ],
            origin: StatusOrigin::Ntes,
            ..TrainStatusResponse::empty(train())
        };
        assert_eq!(response.latest_event().unwrap().event_type, EventType::Arrival);
    }

    #[test]
    fn empty_response() {
        let response = TrainStatusResponse::empty(train());
        assert!(response.is_empty());
        assert_eq!(response.origin, StatusOrigin::None);
        assert!(response.latest_event().is_none());
    }
}
