//! Scraper for the NTES (National Train Enquiry System) website.
//!
//! NTES is the authoritative source of running status but offers no API,
//! only HTML pages behind a session and CSRF token. [`client`] handles the
//! session dance; [`parse`] turns the resulting page into events using the
//! patterns in [`grammar`].

pub mod client;
mod error;
pub mod grammar;
pub mod parse;

pub use client::{NtesClient, NtesConfig, NtesSession};
pub use error::ScrapeError;
pub use parse::{ParsedStatus, parse_status_page};
