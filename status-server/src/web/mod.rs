//! Web layer for the running-status engine.
//!
//! JSON endpoints for station resolution and train status. Network
//! exhaustion is never an error status: it shows up as an empty (or sample)
//! response.

mod dto;
mod routes;
mod samples;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ServeOptions};
