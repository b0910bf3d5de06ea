//! Generic Indian Railways backend APIs.
//!
//! Several third-party APIs expose overlapping train data with different
//! base URLs and authentication schemes. None of them is reliable on its
//! own, so requests go through a [`RequestExecutor`] that rotates through a
//! [`BackendRegistry`] until one answers.
//!
//! Path templates use `{apikey}` where a URL-embedded credential belongs.

mod client;
mod convert;
mod error;
mod registry;
mod types;

pub use client::{APIKEY_PLACEHOLDER, BackendResponse, ExecutorConfig, RequestExecutor, build_url};
pub use convert::{ConversionError, convert_live_status, convert_schedule, first_station_code};
pub use error::BackendError;
pub use registry::{AuthStyle, BackendCredentials, BackendRegistry, BackendSource};
pub use types::{
    CurrentStationDto, LiveStatusDto, RouteStopDto, ScheduleDto, StationLookupDto,
    StationSuggestionDto, TrainDto,
};
