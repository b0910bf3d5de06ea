//! Domain types for the running-status engine.
//!
//! This module contains the canonical records every data source is
//! normalized into, plus validated identifiers. Types enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod event;
mod position;
mod schedule;
mod station;
mod train_number;
mod window;

pub use event::{
    EventType, StatusOrigin, TrainEvent, TrainStatusResponse, dedup_events, delay_minutes,
};
pub use position::{TrainPosition, status_label};
pub use schedule::{ScheduledStop, TrainSchedule};
pub use station::{InvalidStationCode, StationCode};
pub use train_number::{InvalidTrainNumber, TrainNumber};
pub use window::{TimeWindow, TimeWindowError};
