//! Backend client error types.

use std::fmt;

/// Errors from a single backend request attempt.
///
/// These never escape [`RequestExecutor::execute`](super::RequestExecutor::execute);
/// they decide how loudly a failed attempt is logged before the executor
/// rotates to the next backend.
#[derive(Debug)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, TLS, etc.)
    Http(reqwest::Error),

    /// Backend answered with a non-200 status
    Status { status: u16, body: String },

    /// Body was not valid JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// Body parsed but does not report success
    Unsuccessful,

    /// A registry was configured without any sources
    EmptyRegistry,
}

impl BackendError {
    /// Connection failures and timeouts are routine against these backends.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "HTTP error: {e}"),
            BackendError::Status { status, body } => {
                write!(f, "backend returned {status}")?;
                if !body.is_empty() {
                    write!(f, ": {body}")?;
                }
                Ok(())
            }
            BackendError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            BackendError::Unsuccessful => write!(f, "response does not indicate success"),
            BackendError::EmptyRegistry => write!(f, "no backend sources configured"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Http(err)
    }
}
