//! Backend source definitions and the active-backend cursor.

use std::sync::{Mutex, MutexGuard};

use tracing::info;

use super::error::BackendError;

/// Default RapidAPI host header value.
const RAPIDAPI_HOST: &str = "indian-railways-data-api.p.rapidapi.com";

/// Registry name of the source selected at startup.
const DEFAULT_ACTIVE: &str = "rapidapi_journey";

/// How a request to a source is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle<'a> {
    /// `x-rapidapi-key` / `x-rapidapi-host` header pair.
    Headers { key: &'a str, host: &'a str },
    /// Credential substituted into the URL template.
    UrlKey(&'a str),
    /// No authentication.
    None,
}

/// One named backend API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSource {
    pub name: String,
    pub base_url: String,
    pub credential: Option<String>,
    /// Host header value; its presence selects header authentication.
    pub host: Option<String>,
}

impl BackendSource {
    /// Create an unauthenticated source.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            credential: None,
            host: None,
        }
    }

    /// Set the credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Set the host header, switching the source to header authentication.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn auth_style(&self) -> AuthStyle<'_> {
        match (self.credential.as_deref(), self.host.as_deref()) {
            (Some(key), Some(host)) => AuthStyle::Headers { key, host },
            (Some(key), None) => AuthStyle::UrlKey(key),
            (None, _) => AuthStyle::None,
        }
    }
}

/// Credentials for the built-in backend sources.
///
/// Missing keys fall back to the public `demo_key`, which most backends
/// reject; requests then fail over to the next source.
#[derive(Debug, Clone, Default)]
pub struct BackendCredentials {
    pub rapidapi_key: Option<String>,
    pub railway_api_key: Option<String>,
    pub indian_rail_api_key: Option<String>,
}

/// The configured backends and which one is active.
///
/// The registry is never empty. The active-source cursor is the only
/// mutable state shared between requests; it is guarded by a mutex so a
/// registry can sit behind an `Arc` and serve concurrent callers.
#[derive(Debug)]
pub struct BackendRegistry {
    sources: Vec<BackendSource>,
    initial: usize,
    cursor: Mutex<usize>,
}

impl BackendRegistry {
    /// Create a registry with the first source active.
    pub fn new(sources: Vec<BackendSource>) -> Result<Self, BackendError> {
        if sources.is_empty() {
            return Err(BackendError::EmptyRegistry);
        }
        Ok(Self {
            sources,
            initial: 0,
            cursor: Mutex::new(0),
        })
    }

    /// The built-in Indian Railways backends, with `rapidapi_journey` active.
    pub fn with_defaults(credentials: &BackendCredentials) -> Self {
        let demo = || "demo_key".to_string();
        let rapidapi_key = credentials.rapidapi_key.clone().unwrap_or_else(demo);

        let sources = vec![
            BackendSource::new("rapidapi", "https://indian-railway-irctc.p.rapidapi.com")
                .with_credential(rapidapi_key.clone())
                .with_host(RAPIDAPI_HOST),
            BackendSource::new(
                "rapidapi_journey",
                "https://indian-railways-data-api.p.rapidapi.com/api/v1",
            )
            .with_credential(rapidapi_key)
            .with_host(RAPIDAPI_HOST),
            BackendSource::new("railwayapi", "https://api.railwayapi.com/v2").with_credential(
                credentials.railway_api_key.clone().unwrap_or_else(demo),
            ),
            BackendSource::new("indianrail", "https://indianrailapi.com/api/v2").with_credential(
                credentials.indian_rail_api_key.clone().unwrap_or_else(demo),
            ),
            BackendSource::new(
                "irctc",
                "https://www.irctc.co.in/eticketing/protected/mapps1",
            ),
        ];

        let initial = sources
            .iter()
            .position(|s| s.name == DEFAULT_ACTIVE)
            .unwrap_or(0);

        Self {
            sources,
            initial,
            cursor: Mutex::new(initial),
        }
    }

    fn cursor(&self) -> MutexGuard<'_, usize> {
        // The cursor is a plain index; a panic elsewhere can't leave it invalid.
        self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The active source.
    pub fn current(&self) -> BackendSource {
        self.sources[*self.cursor()].clone()
    }

    /// Move to the next source in cyclic order and return it.
    pub fn advance(&self) -> BackendSource {
        let mut cursor = self.cursor();
        *cursor = (*cursor + 1) % self.sources.len();
        let next = self.sources[*cursor].clone();
        drop(cursor);

        info!(backend = %next.name, "switched backend");
        next
    }

    /// Make the named source active. Returns false if no source has that name.
    pub fn select(&self, name: &str) -> bool {
        match self.sources.iter().position(|s| s.name == name) {
            Some(idx) => {
                *self.cursor() = idx;
                true
            }
            None => false,
        }
    }

    /// Return to the source that was active at construction.
    pub fn reset(&self) {
        *self.cursor() = self.initial;
    }

    /// All sources in rotation order.
    pub fn sources(&self) -> &[BackendSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
