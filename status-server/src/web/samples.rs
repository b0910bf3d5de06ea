//! Built-in sample data for a few well-known trains.
//!
//! Served in place of live data when every source fails, so the API keeps
//! answering for demo trains even with no network.

use chrono::{NaiveDateTime, NaiveTime};

use crate::domain::{
    EventType, ScheduledStop, StationCode, StatusOrigin, TrainEvent, TrainNumber, TrainSchedule,
    TrainStatusResponse,
};

struct SampleRun {
    train: u32,
    station_name: &'static str,
    station_code: &'static str,
    status: &'static str,
    delay_minutes: u32,
    /// Actual arrival at the current station, (hour, minute).
    arrival: (u32, u32),
}

const SAMPLE_RUNS: &[SampleRun] = &[
    SampleRun {
        train: 12301,
        station_name: "Kota",
        station_code: "KOTA",
        status: "Running on time",
        delay_minutes: 0,
        arrival: (22, 30),
    },
    SampleRun {
        train: 12302,
        station_name: "Ambala",
        station_code: "UMB",
        status: "Running 15 mins late",
        delay_minutes: 15,
        arrival: (10, 0),
    },
];

struct SampleRoute {
    train: u32,
    name: &'static str,
    from: &'static str,
    to: &'static str,
    /// (station code, arrival, departure)
    stops: &'static [(&'static str, &'static str, &'static str)],
}

const SAMPLE_ROUTES: &[SampleRoute] = &[
    SampleRoute {
        train: 12301,
        name: "Rajdhani Express",
        from: "New Delhi",
        to: "Mumbai Central",
        stops: &[("NDLS", "00:00", "16:55"), ("BCT", "08:35", "00:00")],
    },
    SampleRoute {
        train: 12302,
        name: "Shatabdi Express",
        from: "New Delhi",
        to: "Chandigarh",
        stops: &[("NDLS", "00:00", "06:45"), ("CDG", "10:55", "00:00")],
    },
];

/// Sample status for `train` as of `now`, if it is a sample train.
pub fn sample_status(train: TrainNumber, now: NaiveDateTime) -> Option<TrainStatusResponse> {
    let run = SAMPLE_RUNS.iter().find(|r| r.train == train.value())?;
    let (hour, minute) = run.arrival;
    let arrival = NaiveTime::from_hms_opt(hour, minute, 0).map(|t| now.date().and_time(t));

    let event = TrainEvent {
        raw_text: format!("{} at {}", run.status, run.station_name),
        event_type: EventType::Unknown,
        station_name: run.station_name.to_string(),
        station_code: StationCode::parse(run.station_code).ok(),
        event_datetime: arrival.or(Some(now)),
        delay: Some(run.delay_minutes.to_string()),
    };

    Some(TrainStatusResponse {
        train_number: train,
        start_date: None,
        last_update: Some(now),
        events: vec![event],
        origin: StatusOrigin::Sample,
    })
}

/// Sample schedule for `train`, if it is a sample train.
pub fn sample_schedule(train: TrainNumber) -> Option<TrainSchedule> {
    let route = SAMPLE_ROUTES.iter().find(|r| r.train == train.value())?;
    Some(TrainSchedule {
        train_number: train,
        train_name: Some(route.name.to_string()),
        from_station: Some(route.from.to_string()),
        to_station: Some(route.to.to_string()),
        stops: route
            .stops
            .iter()
            .map(|(code, arrival, departure)| ScheduledStop {
                station_code: code.to_string(),
                arrival: Some(arrival.to_string()),
                departure: Some(departure.to_string()),
            })
            .collect(),
    })
}
