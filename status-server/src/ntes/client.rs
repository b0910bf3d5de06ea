//! NTES enquiry site client.
//!
//! The site has no API. A status lookup is three requests sharing one
//! cookie jar: open a session on the landing page, fetch a CSRF token,
//! then POST the running-status form with that token. An [`NtesSession`]
//! owns the cookie jar, so lookups made through the same session reuse
//! its connection and cookies.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, ORIGIN, PRAGMA, REFERER,
    USER_AGENT,
};
use tracing::debug;

use crate::domain::TrainNumber;

use super::error::ScrapeError;
use super::grammar::extract_csrf_token;

/// Default base URL for the NTES mobile enquiry site.
const DEFAULT_BASE_URL: &str = "https://enquiry.indianrail.gov.in/mntes";

/// The site rejects requests that don't look like they came from its own
/// pages in a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36 Edg/143.0.0.0";
const SITE_REFERER: &str = "https://enquiry.indianrail.gov.in/mntes/";
const SITE_ORIGIN: &str = "https://enquiry.indianrail.gov.in";

/// Date format the site uses in its forms, e.g. "05-Jan-2024".
const FORM_DATE_FORMAT: &str = "%d-%b-%Y";

/// Configuration for the NTES client.
#[derive(Debug, Clone)]
pub struct NtesConfig {
    /// Base URL of the enquiry site (defaults to production)
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NtesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 8,
        }
    }
}

impl NtesConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Opens scraping sessions against the enquiry site.
#[derive(Debug, Clone)]
pub struct NtesClient {
    base_url: String,
    timeout: Duration,
}

impl NtesClient {
    pub fn new(config: NtesConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Open a session: a fresh cookie jar primed by the landing page.
    ///
    /// Certificate validation is disabled; the site's certificate chain
    /// regularly fails verification.
    pub async fn session(&self) -> Result<NtesSession, ScrapeError> {
        let http = reqwest::Client::builder()
            .default_headers(browser_headers())
            .cookie_store(true)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(ScrapeError::Client)?;

        http.get(format!("{}/", self.base_url))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ScrapeError::Bootstrap)?;

        debug!(base_url = %self.base_url, "NTES session opened");

        Ok(NtesSession {
            http,
            base_url: self.base_url.clone(),
        })
    }
}

/// An open session on the enquiry site.
///
/// Dropping the session releases its cookies and connections.
#[derive(Debug)]
pub struct NtesSession {
    http: reqwest::Client,
    base_url: String,
}

impl NtesSession {
    /// Fetch the raw running-status page for a train's run on `date`.
    pub async fn fetch_running_status(
        &self,
        train: &TrainNumber,
        date: NaiveDate,
    ) -> Result<String, ScrapeError> {
        let (token_key, token_value) = self.csrf_token().await?;
        let date = date.format(FORM_DATE_FORMAT).to_string();
        let train_no = train.to_string();

        let form = [
            ("lan", "en"),
            ("jDate", date.as_str()),
            ("trainNo", train_no.as_str()),
            (token_key.as_str(), token_value.as_str()),
        ];

        let html = self
            .http
            .post(format!("{}/tr", self.base_url))
            .query(&[
                ("opt", "TrainRunning"),
                ("subOpt", "FindRunningInstance"),
                ("refDate", date.as_str()),
            ])
            .form(&form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ScrapeError::Query)?
            .text()
            .await
            .map_err(ScrapeError::Query)?;

        debug!(train = %train, bytes = html.len(), "NTES status page fetched");
        Ok(html)
    }

    async fn csrf_token(&self) -> Result<(String, String), ScrapeError> {
        let body = self
            .http
            .get(format!("{}/GetCSRFToken", self.base_url))
            .query(&[("t", Utc::now().timestamp_millis())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ScrapeError::Token)?
            .text()
            .await
            .map_err(ScrapeError::Token)?;

        extract_csrf_token(&body).ok_or(ScrapeError::TokenNotFound)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(REFERER, HeaderValue::from_static(SITE_REFERER));
    headers.insert(ORIGIN, HeaderValue::from_static(SITE_ORIGIN));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers
}
