//! Turn NTES running-status pages into status events.
//!
//! Parsing is best-effort: lines phrased in an unexpected way produce no
//! event rather than an error, so a page can only yield fewer events.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::domain::{StationCode, TrainEvent, dedup_events};

use super::grammar::{
    extract_clock_time, extract_day_month, extract_delay, extract_last_update, extract_start_date,
    extract_station_event, is_event_line, is_full_date, is_status_line, strip_markup,
};

/// How many status lines to keep for display.
const RAW_STATUS_LINES: usize = 5;

/// Everything extracted from one status page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedStatus {
    /// Journey start date as printed, e.g. "04-Jan-2024".
    pub start_date: Option<String>,
    pub last_update: Option<NaiveDateTime>,
    pub events: Vec<TrainEvent>,
    /// The first few status lines, for display when no events parse.
    pub raw_status: Vec<String>,
}

/// Parse a status page. `today` fills in dates the page leaves out.
pub fn parse_status_page(html: &str, today: NaiveDate) -> ParsedStatus {
    let lines = status_lines(&strip_markup(html));

    let last_update = lines.iter().find_map(|l| extract_last_update(l));
    let start_date = lines.iter().find_map(|l| extract_start_date(l));

    let events = lines
        .iter()
        .filter(|l| is_event_line(l))
        .filter_map(|l| parse_event_line(l, last_update, today))
        .collect();

    ParsedStatus {
        start_date,
        last_update,
        events: dedup_events(events),
        raw_status: lines.into_iter().take(RAW_STATUS_LINES).collect(),
    }
}

/// Non-empty, status-relevant lines, first occurrence only.
fn status_lines(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && is_status_line(l))
        .filter(|l| seen.insert(*l))
        .map(str::to_string)
        .collect()
}

fn parse_event_line(
    line: &str,
    last_update: Option<NaiveDateTime>,
    today: NaiveDate,
) -> Option<TrainEvent> {
    let delay = extract_delay(line);
    let station_event = extract_station_event(line)?;

    if station_event.station.is_empty() {
        return None;
    }

    let event_datetime = build_event_datetime(
        extract_day_month(line),
        extract_clock_time(line),
        last_update,
        today,
    );

    Some(TrainEvent {
        raw_text: line.to_string(),
        event_type: station_event.event_type,
        station_name: station_event.station,
        station_code: StationCode::parse(&station_event.code).ok(),
        event_datetime,
        delay,
    })
}

/// Resolve a line's date and time fragments into a full datetime.
///
/// - A date with a year is used as-is.
/// - A date without a year takes the year of `last_update`, else `today`.
/// - No usable date: `last_update`'s date, else `today` when the line at
///   least carried a time.
///
/// A missing time means midnight.
fn build_event_datetime(
    date_part: Option<&str>,
    time_part: Option<&str>,
    last_update: Option<NaiveDateTime>,
    today: NaiveDate,
) -> Option<NaiveDateTime> {
    let time = time_part.unwrap_or("00:00");
    let parse = |date: &str| {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%d-%b-%Y %H:%M").ok()
    };

    if let Some(date) = date_part {
        let full = if is_full_date(date) {
            date.to_string()
        } else {
            let year = last_update.map_or(today.year(), |lu| lu.year());
            format!("{date}-{year}")
        };
        if let Some(dt) = parse(&full) {
            return Some(dt);
        }
    }

    let fallback_date = match (last_update, time_part) {
        (Some(lu), _) => lu.date(),
        (None, Some(_)) => today,
        (None, None) => return None,
    };
    parse(&fallback_date.format("%d-%b-%Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 3, 1)
    }

    const PAGE: &str = r#"
<html>
<head><script>var s = "Departed from Nowhere (NW) 01:00";</script></head>
<body>
<div>Train 12958 Running Status</div>
<div>Start Date : 04-Jan-2024</div>
<div>Last Updates On 05-Jan-2024 09:00</div>
<table>
<tr><td>Departed from Ajmer (AII) 06:10 05-Jan</td></tr>
<tr><td>Departed from Jaipur (JP) 10:30 05-Jan</td><td>Delay: (0:15)</td></tr>
<tr><td>Departed from Jaipur (JP) 10:30 05-Jan</td><td>Delay: (0:15)</td></tr>
<tr><td>Arriving at Kota soon</td></tr>
<tr><td>Platform 3</td></tr>
</table>
</body>
</html>
"#;

    #[test]
    fn parses_full_page() {
        let parsed = parse_status_page(PAGE, today());

        assert_eq!(parsed.start_date.as_deref(), Some("04-Jan-2024"));
        assert_eq!(parsed.last_update, Some(dt(2024, 1, 5, 9, 0)));
        assert_eq!(parsed.events.len(), 2);

        let ajmer = &parsed.events[0];
        assert_eq!(ajmer.event_type, EventType::Departure);
        assert_eq!(ajmer.station_name, "Ajmer");
        assert_eq!(ajmer.event_datetime, Some(dt(2024, 1, 5, 6, 10)));
        assert_eq!(ajmer.delay, None);

        let jaipur = &parsed.events[1];
        assert_eq!(jaipur.station_name, "Jaipur");
        assert_eq!(jaipur.station_code.as_ref().unwrap().as_str(), "JP");
        assert_eq!(jaipur.event_datetime, Some(dt(2024, 1, 5, 10, 30)));
        assert_eq!(jaipur.delay.as_deref(), Some("0:15"));
    }

    #[test]
    fn script_contents_are_ignored() {
        let parsed = parse_status_page(PAGE, today());
        assert!(parsed.events.iter().all(|e| e.station_name != "Nowhere"));
    }

    #[test]
    fn raw_status_keeps_first_lines_deduplicated() {
        let parsed = parse_status_page(PAGE, today());
        assert_eq!(
            parsed.raw_status,
            vec![
                "Start Date : 04-Jan-2024",
                "Last Updates On 05-Jan-2024 09:00",
                "Departed from Ajmer (AII) 06:10 05-Jan",
                "Departed from Jaipur (JP) 10:30 05-JanDelay: (0:15)",
                "Arriving at Kota soon",
            ]
        );
    }

    #[test]
    fn departed_line_with_last_update_year() {
        let page = "Last Updates On 05-Jan-2024 09:00\nDeparted from Jaipur (JP) 10:30 05-Jan";
        let parsed = parse_status_page(page, today());

        assert_eq!(parsed.events.len(), 1);
        let event = &parsed.events[0];
        assert_eq!(event.event_type, EventType::Departure);
        assert_eq!(event.station_name, "Jaipur");
        assert_eq!(event.station_code.as_ref().unwrap().as_str(), "JP");
        assert_eq!(event.event_datetime, Some(dt(2024, 1, 5, 10, 30)));
    }

    #[test]
    fn delay_on_same_line() {
        let page = "Arrived at Kota Jn (KOTA) 13:05 05-Jan-2024 Delay: (1:05)";
        let parsed = parse_status_page(page, today());
        assert_eq!(parsed.events[0].delay.as_deref(), Some("1:05"));
        assert_eq!(parsed.events[0].delay_minutes(), Some(65));
    }

    #[test]
    fn duplicate_lines_collapse() {
        let line = "Departed from Jaipur (JP) 10:30 05-Jan-2024";
        let page = format!("<p>{line}</p>\n<p>{line}</p>\n<span>{line}</span>");
        let parsed = parse_status_page(&page, today());
        assert_eq!(parsed.events.len(), 1);
    }

    #[test]
    fn same_event_different_wording_collapses() {
        let page = "Departed from Jaipur (JP) 10:30 05-Jan-2024\n\
                    Departed from Jaipur (JP) at 10:30 on 05-Jan-2024";
        let parsed = parse_status_page(page, today());
        assert_eq!(parsed.events.len(), 1);
        assert!(parsed.events[0].raw_text.ends_with("10:30 05-Jan-2024"));
    }

    #[test]
    fn missing_date_uses_last_update_date() {
        let page = "Last Updates On 05-Jan-2024 09:00\nArrived at Ajmer (AII) 08:05";
        let parsed = parse_status_page(page, today());
        assert_eq!(parsed.events[0].event_datetime, Some(dt(2024, 1, 5, 8, 5)));
    }

    #[test]
    fn missing_year_without_last_update_uses_today() {
        let page = "Departed from Jaipur (JP) 10:30 05-Jan";
        let parsed = parse_status_page(page, today());
        assert_eq!(parsed.events[0].event_datetime, Some(dt(2026, 1, 5, 10, 30)));
    }

    #[test]
    fn time_only_without_last_update_uses_today() {
        let page = "Departed from Jaipur (JP) 10:30";
        let parsed = parse_status_page(page, today());
        assert_eq!(parsed.events[0].event_datetime, Some(dt(2026, 3, 1, 10, 30)));
    }

    #[test]
    fn no_date_or_time_leaves_datetime_empty() {
        let page = "Departed from Jaipur (JP)";
        let parsed = parse_status_page(page, today());
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.events[0].event_datetime, None);
    }

    #[test]
    fn unrecognized_phrasing_is_skipped() {
        let page = "Departure from Jaipur expected\nYet to start from source\nArriving at Kota soon";
        let parsed = parse_status_page(page, today());
        assert!(parsed.events.is_empty());
        assert_eq!(parsed.raw_status.len(), 3);
    }

    #[test]
    fn empty_page() {
        assert_eq!(parse_status_page("", today()), ParsedStatus::default());
    }
}
