//! Station name resolution.
//!
//! Turns human-entered station names into station codes using a static
//! index of known names, with the backend APIs as a last resort.

mod index;
mod resolver;

pub use index::StationIndex;
pub use resolver::{MAX_FUZZY_DISTANCE, MatchKind, Resolution, StationResolver, levenshtein};
