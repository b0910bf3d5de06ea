//! Timetabled routes.

use super::TrainNumber;

/// One timetabled stop on a train's route.
///
/// Times are kept as printed by the source ("16:55"); "00:00" conventionally
/// marks the missing arrival at the origin or departure at the terminus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStop {
    pub station_code: String,
    pub arrival: Option<String>,
    pub departure: Option<String>,
}

/// A train's timetabled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainSchedule {
    pub train_number: TrainNumber,
    pub train_name: Option<String>,
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub stops: Vec<ScheduledStop>,
}
