//! Time windows for filtering status events.
//!
//! Callers describe a window with optional start/end bounds. Each bound is
//! either a bare time of day ("22:00") or a full datetime
//! ("2024-01-05T22:00:00Z"). This module turns those bounds into a concrete
//! half-open interval.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Error returned when a window bound can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeWindowError {
    #[error("invalid time format: {0:?}; use HH:MM[:SS] or an ISO datetime")]
    InvalidTimeFormat(String),
}

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// One parsed window bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    /// Carried an explicit date.
    Dated(NaiveDateTime),
    /// Time of day only; the date comes from context.
    Bare(NaiveTime),
}

impl Bound {
    /// Parse a bound, trying datetime forms before bare times.
    fn parse(raw: &str) -> Result<Self, TimeWindowError> {
        let s = raw.trim();
        let normalized = match s.strip_suffix('Z') {
            Some(prefix) => format!("{prefix}+00:00"),
            None => s.to_string(),
        };

        for fmt in OFFSET_DATETIME_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
                return Ok(Bound::Dated(dt.with_timezone(&Local).naive_local()));
            }
        }

        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
                return Ok(Bound::Dated(dt));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
            return Ok(Bound::Dated(date.and_time(NaiveTime::MIN)));
        }

        for fmt in TIME_FORMATS {
            if let Ok(t) = NaiveTime::parse_from_str(&normalized, fmt) {
                return Ok(Bound::Bare(t));
            }
        }

        Err(TimeWindowError::InvalidTimeFormat(raw.to_string()))
    }

    fn date(&self) -> Option<NaiveDate> {
        match self {
            Bound::Dated(dt) => Some(dt.date()),
            Bound::Bare(_) => None,
        }
    }

    fn resolve(&self, base_date: NaiveDate) -> NaiveDateTime {
        match self {
            Bound::Dated(dt) => *dt,
            Bound::Bare(t) => base_date.and_time(*t),
        }
    }
}

/// A half-open interval `[start, end)` of local datetimes.
///
/// `start <= end` always holds; [`TimeWindow::new`] swaps reversed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Create a window, swapping the bounds if they are reversed.
    pub fn new(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// The whole calendar day containing `date`.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `dt` falls inside `[start, end)`.
    pub fn contains(&self, dt: NaiveDateTime) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Compute a window from optional raw bounds, using the local clock.
    ///
    /// See [`TimeWindow::compute_at`] for the rules.
    pub fn compute(start: Option<&str>, end: Option<&str>) -> Result<Self, TimeWindowError> {
        Self::compute_at(start, end, Local::now().naive_local())
    }

    /// The window a caller asked for, if any.
    ///
    /// Returns `None` when both bounds are absent or blank, meaning "don't
    /// filter". Otherwise behaves like [`TimeWindow::compute_at`].
    pub fn requested_at(
        start: Option<&str>,
        end: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Option<Self>, TimeWindowError> {
        if !is_given(start) && !is_given(end) {
            return Ok(None);
        }
        Self::compute_at(start, end, now).map(Some)
    }

    /// Compute a window from optional raw bounds relative to `now`.
    ///
    /// - Neither bound: today from midnight to midnight.
    /// - One bound: the other is `now`; reversed bounds are swapped.
    /// - Both bounds: bare times take the date of whichever bound carried
    ///   one (start first), else today. If the result is reversed and both
    ///   bounds were bare times, the window crosses midnight and `end` moves
    ///   to the next day. Otherwise the bounds are swapped.
    ///
    /// Blank strings count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, NaiveDate};
    /// use status_server::domain::TimeWindow;
    ///
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(12, 0, 0).unwrap();
    ///
    /// // Overnight shift
    /// let w = TimeWindow::compute_at(Some("22:00"), Some("02:00"), now).unwrap();
    /// assert_eq!(w.duration(), Duration::hours(4));
    ///
    /// assert!(TimeWindow::compute_at(Some("noon"), None, now).is_err());
    /// ```
    pub fn compute_at(
        start: Option<&str>,
        end: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Self, TimeWindowError> {
        let today = now.date();
        let start = start
            .filter(|s| !s.trim().is_empty())
            .map(Bound::parse)
            .transpose()?;
        let end = end
            .filter(|s| !s.trim().is_empty())
            .map(Bound::parse)
            .transpose()?;

        let window = match (start, end) {
            (None, None) => Self::day(today),
            (None, Some(end)) => {
                let end = end.resolve(end.date().unwrap_or(today));
                Self::new(now, end)
            }
            (Some(start), None) => {
                let start = start.resolve(start.date().unwrap_or(today));
                Self::new(start, now)
            }
            (Some(start), Some(end)) => {
                let base_date = start.date().or(end.date()).unwrap_or(today);
                let start_dt = start.resolve(base_date);
                let end_dt = end.resolve(base_date);

                match (start, end) {
                    (Bound::Bare(_), Bound::Bare(_)) if end_dt < start_dt => Self {
                        start: start_dt,
                        end: end_dt + Duration::days(1),
                    },
                    _ => Self::new(start_dt, end_dt),
                }
            }
        };

        Ok(window)
    }
}

fn is_given(bound: Option<&str>) -> bool {
    bound.is_some_and(|s| !s.trim().is_empty())
}
