//! Current-position summaries.

use chrono::NaiveDateTime;

use super::{EventType, TrainNumber, TrainStatusResponse};

/// Where a train is now, condensed from its latest status event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainPosition {
    pub train_number: TrainNumber,
    pub station: String,
    pub last_event: EventType,
    pub event_time: Option<NaiveDateTime>,
    /// Delay in minutes; 0 when none was reported.
    pub delay_minutes: i64,
    pub last_update: Option<NaiveDateTime>,
    /// The source line of the latest event.
    pub raw_status: String,
}

impl TrainPosition {
    /// Summarize the latest event of `response`.
    ///
    /// Returns `None` if the response has no events.
    pub fn from_response(response: &TrainStatusResponse) -> Option<Self> {
        let latest = response.latest_event()?;
        Some(Self {
            train_number: response.train_number,
            station: latest.station_name.clone(),
            last_event: latest.event_type,
            event_time: latest.event_datetime,
            delay_minutes: latest.delay_minutes().unwrap_or(0),
            last_update: response.last_update,
            raw_status: latest.raw_text.clone(),
        })
    }

    /// Human-readable status, e.g. "Late by 15 mins".
    pub fn status_label(&self) -> String {
        status_label(self.delay_minutes)
    }
}

/// Human-readable running status for a delay in minutes.
///
/// # Examples
///
/// ```
/// use status_server::domain::status_label;
///
/// assert_eq!(status_label(0), "On Time");
/// assert_eq!(status_label(15), "Late by 15 mins");
/// assert_eq!(status_label(-3), "Early");
/// ```
pub fn status_label(delay_minutes: i64) -> String {
    match delay_minutes {
        0 => "On Time".to_string(),
        d if d > 0 => format!("Late by {d} mins"),
        _ => "Early".to_string(),
    }
}
