//! Station name → code resolution.
//!
//! Resolution tries, in order: an exact key match, a substring match in
//! either direction, the closest key by edit distance (when close enough),
//! and finally the backend name-to-code endpoint. Misses are `None`, never
//! errors.

use std::sync::Arc;

use tracing::debug;

use crate::backends::{RequestExecutor, StationLookupDto, first_station_code};
use crate::domain::StationCode;

use super::index::{StationIndex, normalize};

/// Largest edit distance accepted by fuzzy matching.
pub const MAX_FUZZY_DISTANCE: usize = 2;

/// Which step of the resolution produced a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Substring,
    Fuzzy { distance: usize },
    Backend,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Substring => "substring",
            MatchKind::Fuzzy { .. } => "fuzzy",
            MatchKind::Backend => "backend",
        }
    }
}

/// A resolved code and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub code: StationCode,
    pub kind: MatchKind,
}

/// Resolves free-text station names against a [`StationIndex`].
#[derive(Debug, Clone)]
pub struct StationResolver {
    index: Arc<StationIndex>,
    backend: Option<RequestExecutor>,
}

impl StationResolver {
    /// A resolver that only consults the local index.
    pub fn new(index: Arc<StationIndex>) -> Self {
        Self {
            index,
            backend: None,
        }
    }

    /// Fall back to the backend name-to-code endpoint on local misses.
    pub fn with_backend(mut self, executor: RequestExecutor) -> Self {
        self.backend = Some(executor);
        self
    }

    pub fn index(&self) -> &StationIndex {
        &self.index
    }

    /// Resolve a name to a code, or `None` if nothing matches.
    pub async fn resolve(&self, name: &str) -> Option<StationCode> {
        self.resolve_detailed(name).await.map(|r| r.code)
    }

    /// As [`resolve`](Self::resolve), also reporting the match kind.
    pub async fn resolve_detailed(&self, name: &str) -> Option<Resolution> {
        if let Some(found) = self.resolve_local(name) {
            return Some(found);
        }

        let query = name.trim();
        if query.is_empty() {
            return None;
        }

        let code = self.lookup_backend(query).await?;
        Some(Resolution {
            code,
            kind: MatchKind::Backend,
        })
    }

    /// The index-only steps: exact, substring, then fuzzy.
    pub fn resolve_local(&self, name: &str) -> Option<Resolution> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }

        if let Some(code) = self.index.get(&key) {
            return Some(Resolution {
                code: code.clone(),
                kind: MatchKind::Exact,
            });
        }

        if let Some((_, code)) = self
            .index
            .iter()
            .find(|(candidate, _)| candidate.contains(key.as_str()) || key.contains(candidate))
        {
            return Some(Resolution {
                code: code.clone(),
                kind: MatchKind::Substring,
            });
        }

        let mut best: Option<(usize, &StationCode)> = None;
        for (candidate, code) in self.index.iter() {
            let distance = levenshtein(&key, candidate);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, code));
            }
        }

        best.filter(|(distance, _)| *distance <= MAX_FUZZY_DISTANCE)
            .map(|(distance, code)| Resolution {
                code: code.clone(),
                kind: MatchKind::Fuzzy { distance },
            })
    }

    async fn lookup_backend(&self, name: &str) -> Option<StationCode> {
        let executor = self.backend.as_ref()?;
        let path = format!(
            "/name-to-code/station/{}/apikey/{{apikey}}/",
            urlencoding::encode(name)
        );

        let response = executor.execute(&path, 1).await?;
        let lookup: StationLookupDto = match serde_json::from_value(response.body) {
            Ok(lookup) => lookup,
            Err(e) => {
                debug!(backend = %response.backend, error = %e, "unexpected station lookup payload");
                return None;
            }
        };

        first_station_code(&lookup)
    }
}

/// Edit distance between two strings, counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
