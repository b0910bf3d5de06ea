//! Server configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::backends::BackendCredentials;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);
const DEFAULT_REQUEST_BUDGET_SECS: u64 = 30;

/// Error for an environment variable that is set but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Everything `main` needs to wire the server together.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: BackendCredentials,
    /// Overrides the NTES base URL (for testing against a stub).
    pub ntes_base_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// Substitute built-in sample data when no source has any.
    pub sample_fallback: bool,
    /// Upper bound on the time one HTTP request may spend resolving status.
    pub request_budget: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `RAPIDAPI_KEY`, `RAILWAY_API_KEY`, `INDIAN_RAIL_API_KEY` | unset (demo key) |
    /// | `NTES_BASE_URL` | production NTES |
    /// | `BIND_ADDR` | `127.0.0.1:3000` |
    /// | `SAMPLE_FALLBACK` | `true` |
    /// | `REQUEST_BUDGET_SECS` | `30` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value.parse().map_err(|_| ConfigError {
                var: "BIND_ADDR",
                value,
                reason: "expected host:port",
            })?,
            None => DEFAULT_BIND_ADDR,
        };

        let sample_fallback = match get("SAMPLE_FALLBACK") {
            Some(value) => parse_bool(&value).ok_or(ConfigError {
                var: "SAMPLE_FALLBACK",
                value,
                reason: "expected true or false",
            })?,
            None => true,
        };

        let budget_secs = match get("REQUEST_BUDGET_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError {
                        var: "REQUEST_BUDGET_SECS",
                        value,
                        reason: "expected a positive number of seconds",
                    });
                }
            },
            None => DEFAULT_REQUEST_BUDGET_SECS,
        };

        Ok(Self {
            credentials: BackendCredentials {
                rapidapi_key: get("RAPIDAPI_KEY"),
                railway_api_key: get("RAILWAY_API_KEY"),
                indian_rail_api_key: get("INDIAN_RAIL_API_KEY"),
            },
            ntes_base_url: get("NTES_BASE_URL"),
            bind_addr,
            sample_fallback,
            request_budget: Duration::from_secs(budget_secs),
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
