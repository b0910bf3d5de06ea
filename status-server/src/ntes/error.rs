//! NTES scraper error types.

/// Errors from a scrape of the NTES enquiry site.
///
/// Every variant means "no page this time"; callers fall back to the
/// generic backends rather than surfacing these.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The landing page request that opens a session failed
    #[error("session bootstrap failed: {0}")]
    Bootstrap(#[source] reqwest::Error),

    /// The token page could not be fetched
    #[error("token request failed: {0}")]
    Token(#[source] reqwest::Error),

    /// The token page did not contain a recognizable token
    #[error("CSRF token not found in token page")]
    TokenNotFound,

    /// The running-status query failed
    #[error("running-status query failed: {0}")]
    Query(#[source] reqwest::Error),
}
