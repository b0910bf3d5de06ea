//! Indian Railways running-status server.
//!
//! Answers "where is train N right now?" by scraping the NTES enquiry site
//! and, when that fails, rotating through several third-party railway APIs.
//! Also resolves free-text station names to station codes.

pub mod backends;
pub mod cache;
pub mod config;
pub mod domain;
pub mod ntes;
pub mod stations;
pub mod status;
pub mod web;

#[cfg(test)]
mod test_support;
