//! Running-status resolution.
//!
//! [`StatusAggregator`] walks an ordered list of [`StatusSource`]s (the
//! NTES scraper first, then the generic backends) and normalizes whatever
//! the first working source returns into a
//! [`TrainStatusResponse`](crate::domain::TrainStatusResponse).

mod aggregator;
mod source;

pub use aggregator::{StatusAggregator, windowed_status};
pub use source::{BackendLiveSource, NtesSource, RawStatus, SourceError, StatusSource};
