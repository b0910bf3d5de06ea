//! Caching layer for running-status lookups.
//!
//! A status lookup can cost an NTES session plus several backend attempts,
//! while the underlying data changes every few minutes at most. Responses
//! are cached per train for a short TTL. Empty responses are not cached, so
//! a train with no data is retried on the next request.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{TrainNumber, TrainStatusResponse};
use crate::status::StatusAggregator;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Status aggregator with caching.
pub struct CachedStatusClient {
    aggregator: StatusAggregator,
    statuses: MokaCache<TrainNumber, Arc<TrainStatusResponse>>,
}

impl CachedStatusClient {
    /// Create a new cached client.
    pub fn new(aggregator: StatusAggregator, config: &CacheConfig) -> Self {
        let statuses = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            aggregator,
            statuses,
        }
    }

    /// Unfiltered live status, from cache if fresh.
    pub async fn get_live_status(&self, train: TrainNumber) -> Arc<TrainStatusResponse> {
        if let Some(cached) = self.statuses.get(&train).await {
            debug!(train = %train, "status cache hit");
            return cached;
        }

        let response = Arc::new(self.aggregator.get_live_status(train).await);
        if !response.is_empty() {
            self.statuses.insert(train, response.clone()).await;
        }
        response
    }

    /// Access the underlying aggregator for operations that bypass cache.
    pub fn aggregator(&self) -> &StatusAggregator {
        &self.aggregator
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.statuses.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusOrigin;
    use crate::status::{RawStatus, SourceError, StatusSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        page: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_raw_status(&self, _train: &TrainNumber) -> Result<RawStatus, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.page
                .map(|p| RawStatus::StatusPage(p.to_string()))
                .ok_or(SourceError::Exhausted)
        }
    }

    fn client(page: Option<&'static str>) -> (CachedStatusClient, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            page,
            calls: AtomicUsize::new(0),
        });
        let aggregator = StatusAggregator::new(vec![source.clone() as Arc<dyn StatusSource>]);
        (
            CachedStatusClient::new(aggregator, &CacheConfig::default()),
            source,
        )
    }

    fn train() -> TrainNumber {
        TrainNumber::parse("12958").unwrap()
    }

    #[tokio::test]
    async fn repeat_lookups_hit_cache() {
        let (client, source) = client(Some("Departed from Jaipur (JP) 10:30 05-Jan-2024"));

        let first = client.get_live_status(train()).await;
        let second = client.get_live_status(train()).await;
        assert_eq!(first.origin, StatusOrigin::Ntes);
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        client.invalidate_cache();
        client.get_live_status(train()).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_responses_are_not_cached() {
        let (client, source) = client(None);

        assert!(client.get_live_status(train()).await.is_empty());
        assert!(client.get_live_status(train()).await.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
