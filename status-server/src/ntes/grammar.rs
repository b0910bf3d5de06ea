//! Patterns recognized on NTES pages.
//!
//! Each pattern sits behind its own extraction function so the grammar can
//! change without touching the parsing control flow in `parse.rs`.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::EventType;

/// Phrases that mark a line as status-relevant.
const STATUS_KEYWORDS: &[&str] = &[
    "arrived",
    "arrive",
    "arriving",
    "departed",
    "depart",
    "departure",
    "on time",
    "yet to start",
    "reached destination",
    "current position",
    "last updates on",
    "start date",
];

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script.*?>.*?</script>").unwrap());
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style.*?>.*?</style>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static EVENT_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(arrived|arrive|arriving|departed|depart|departure)\b").unwrap()
});

static LAST_UPDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Last Updates On\s*(?P<date>\d{1,2}-[A-Za-z]{3}-\d{4})(?:\s+(?P<time>\d{1,2}:\d{2}))?",
    )
    .unwrap()
});

static START_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Start Date\s*:\s*(?P<date>\d{1,2}-[A-Za-z]{3}-\d{4})").unwrap()
});

static DELAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Delay[:\-\s]*\(?\s*(?:Delay\s*)?([0-9:]{1,5})\)?").unwrap()
});

static STATION_EVENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<verb>Departed|Arrived)\b\s+(?:from|at)\s+(?P<station>[^()]+?)\s*\(\s*(?P<code>[A-Z0-9]{1,6})\s*\)",
    )
    .unwrap()
});

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2})").unwrap());

static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}-[A-Za-z]{3}(?:-\d{4})?)").unwrap());

static FULL_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}-[A-Za-z]{3}-\d{4}$").unwrap());

static CSRF_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"name='([^']+)' value='([^']+)'").unwrap());

/// Station and event type extracted from an event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationEvent {
    pub event_type: EventType,
    pub station: String,
    pub code: String,
}

/// Drop `<script>`/`<style>` blocks, then every remaining tag.
pub fn strip_markup(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    TAG.replace_all(&text, "").into_owned()
}

/// Whether a line mentions any status keyword (case-insensitive).
pub fn is_status_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    STATUS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Whether a line mentions an arrival/departure verb as a whole word.
pub fn is_event_line(line: &str) -> bool {
    EVENT_VERB.is_match(line)
}

/// "Last Updates On 05-Jan-2024 09:00"; time defaults to midnight.
pub fn extract_last_update(line: &str) -> Option<NaiveDateTime> {
    let caps = LAST_UPDATE.captures(line)?;
    let date = caps.name("date")?.as_str();
    let time = caps.name("time").map_or("00:00", |m| m.as_str());
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%d-%b-%Y %H:%M").ok()
}

/// "Start Date : 05-Jan-2024", returned as printed.
pub fn extract_start_date(line: &str) -> Option<String> {
    START_DATE
        .captures(line)
        .and_then(|caps| caps.name("date"))
        .map(|m| m.as_str().to_string())
}

/// "Delay: (0:15)", "Delay (0:15)" and similar.
pub fn extract_delay(line: &str) -> Option<String> {
    DELAY
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// "Departed from Jaipur (JP)" / "Arrived at Kota Jn (KOTA)".
pub fn extract_station_event(line: &str) -> Option<StationEvent> {
    let caps = STATION_EVENT.captures(line)?;
    Some(StationEvent {
        event_type: EventType::from_verb(caps.name("verb")?.as_str()),
        station: caps.name("station")?.as_str().trim().to_string(),
        code: caps.name("code")?.as_str().trim().to_ascii_uppercase(),
    })
}

/// First "HH:MM" on the line.
pub fn extract_clock_time(line: &str) -> Option<&str> {
    CLOCK_TIME.find(line).map(|m| m.as_str())
}

/// First "DD-Mon" or "DD-Mon-YYYY" on the line.
pub fn extract_day_month(line: &str) -> Option<&str> {
    DAY_MONTH.find(line).map(|m| m.as_str())
}

/// Whether a date string already carries a year.
pub fn is_full_date(date: &str) -> bool {
    FULL_DATE.is_match(date)
}

/// The `name='KEY' value='VALUE'` pair embedded in the token page.
pub fn extract_csrf_token(body: &str) -> Option<(String, String)> {
    let caps = CSRF_TOKEN.captures(body)?;
    Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn strips_scripts_styles_and_tags() {
        let html = "<html><head><style>p { color: red }</style>\
                    <SCRIPT type='x'>var a = '<b>Departed</b>';</SCRIPT></head>\
                    <body><p>Departed from <b>Jaipur</b> (JP)</p></body></html>";
        assert_eq!(strip_markup(html), "Departed from Jaipur (JP)");
    }

    #[test]
    fn keyword_filter_is_case_insensitive() {
        assert!(is_status_line("TRAIN IS ON TIME"));
        assert!(is_status_line("Yet to start from source"));
        assert!(is_status_line("last updates on 05-Jan-2024"));
        assert!(!is_status_line("Platform 3"));
    }

    #[test]
    fn event_verbs_need_word_boundaries() {
        assert!(is_event_line("Departed from Jaipur"));
        assert!(!is_event_line("Expected Arrival 10:00"));
        assert!(is_event_line("Arriving shortly"));
        assert!(!is_event_line("Departedness"));
    }

    #[test]
    fn last_update_with_and_without_time() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(
            extract_last_update("Last Updates On 05-Jan-2024 09:00"),
            Some(expected)
        );
        assert_eq!(
            extract_last_update("last updates on 5-jan-2024"),
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(extract_last_update("Last Updates On yesterday"), None);
    }

    #[test]
    fn start_date() {
        assert_eq!(
            extract_start_date("Start Date : 04-Jan-2024").as_deref(),
            Some("04-Jan-2024")
        );
        assert_eq!(extract_start_date("Start Date"), None);
    }

    #[test]
    fn delay_variants() {
        assert_eq!(extract_delay("Delay: (0:15)").as_deref(), Some("0:15"));
        assert_eq!(extract_delay("Delay (1:05)").as_deref(), Some("1:05"));
        assert_eq!(extract_delay("delay-20").as_deref(), Some("20"));
        assert_eq!(extract_delay("On time"), None);
    }

    #[test]
    fn station_event() {
        let event = extract_station_event("Departed from Jaipur (JP) 10:30 05-Jan").unwrap();
        assert_eq!(event.event_type, EventType::Departure);
        assert_eq!(event.station, "Jaipur");
        assert_eq!(event.code, "JP");

        let event = extract_station_event("arrived at Kota Jn ( kota )").unwrap();
        assert_eq!(event.event_type, EventType::Arrival);
        assert_eq!(event.station, "Kota Jn");
        assert_eq!(event.code, "KOTA");

        assert!(extract_station_event("Departure expected at 10:30").is_none());
    }

    #[test]
    fn time_and_date_fragments() {
        let line = "Arrived at Ajmer (AII) 08:05 05-Jan-2024";
        assert_eq!(extract_clock_time(line), Some("08:05"));
        assert_eq!(extract_day_month(line), Some("05-Jan-2024"));
        assert!(is_full_date("05-Jan-2024"));
        assert!(!is_full_date("05-Jan"));
    }

    #[test]
    fn csrf_token() {
        let body = "<input type='hidden' name='csrf_3f2a' value='a1b2c3'/>";
        assert_eq!(
            extract_csrf_token(body),
            Some(("csrf_3f2a".to_string(), "a1b2c3".to_string()))
        );
        assert_eq!(extract_csrf_token("<input name=\"x\" value=\"y\">"), None);
    }
}
