//! Station code types.

use std::fmt;

/// Longest station code in use on Indian Railways (e.g. "KOAA", "VSKP", "CSMT").
const MAX_CODE_LEN: usize = 6;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A valid Indian Railways station code.
///
/// Station codes are 1-6 uppercase ASCII letters or digits ("JP", "NDLS",
/// "MAJN"). This type guarantees that any `StationCode` value is valid by
/// construction.
///
/// # Examples
///
/// ```
/// use status_server::domain::StationCode;
///
/// let ndls = StationCode::parse("NDLS").unwrap();
/// assert_eq!(ndls.as_str(), "NDLS");
///
/// // Lowercase is rejected by `parse`, but accepted by `parse_normalized`
/// assert!(StationCode::parse("ndls").is_err());
/// assert!(StationCode::parse_normalized(" ndls ").is_ok());
///
/// // Too long
/// assert!(StationCode::parse("ABCDEFG").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code from a string.
    ///
    /// The input must be 1-6 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        if s.is_empty() || s.len() > MAX_CODE_LEN {
            return Err(InvalidStationCode {
                reason: "must be 1-6 characters",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(InvalidStationCode {
                reason: "must be uppercase ASCII letters or digits",
            });
        }

        Ok(StationCode(s.to_string()))
    }

    /// Parse a station code after trimming and uppercasing the input.
    ///
    /// Scraped pages and backend payloads are not consistent about case.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the station code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
