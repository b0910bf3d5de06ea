//! Train number type.

use std::fmt;

/// Error returned when parsing an invalid train number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train number {input:?}: must be a 5-digit number (10000-99999)")]
pub struct InvalidTrainNumber {
    input: String,
}

/// A validated Indian Railways train number.
///
/// Train numbers are five digits in the range 10000-99999. The numeric
/// value is kept so callers can format it without re-validating.
///
/// # Examples
///
/// ```
/// use status_server::domain::TrainNumber;
///
/// let train = TrainNumber::parse("12301").unwrap();
/// assert_eq!(train.to_string(), "12301");
///
/// assert!(TrainNumber::parse("0123").is_err());
/// assert!(TrainNumber::parse("123456").is_err());
/// assert!(TrainNumber::parse("12A01").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainNumber(u32);

impl TrainNumber {
    /// Parse a train number, ignoring surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainNumber> {
        let trimmed = s.trim();
        let invalid = || InvalidTrainNumber {
            input: s.to_string(),
        };

        if trimmed.len() != 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let value: u32 = trimmed.parse().map_err(|_| invalid())?;
        Self::from_u32(value).ok_or_else(invalid)
    }

    /// Build a train number from its numeric value.
    pub fn from_u32(value: u32) -> Option<Self> {
        (10_000..=99_999).contains(&value).then_some(Self(value))
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.0)
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
