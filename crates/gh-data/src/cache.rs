//! Dataset caching layer
//!
//! The backend serves one immutable row set, so the cache holds a single
//! entry: the last fetched [`Dataset`] plus its fetch time. Entries stay
//! fresh for five minutes. The fetch path holds an async mutex across the
//! request, so concurrent callers share one in-flight fetch instead of
//! stampeding the backend.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use gh_core::Dataset;

use crate::client::RowFetcher;
use crate::DataError;

const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    dataset: Dataset,
    fetched_at: Instant,
}

/// Single-entry dataset cache in front of a [`RowFetcher`].
pub struct DatasetCache<F> {
    fetcher: F,
    stale_after: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<F: RowFetcher> DatasetCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_staleness(fetcher, STALE_AFTER)
    }

    pub fn with_staleness(fetcher: F, stale_after: Duration) -> Self {
        Self {
            fetcher,
            stale_after,
            entry: Mutex::new(None),
        }
    }

    /// Return the cached dataset, fetching if absent or stale. The returned
    /// `Arc` is shared with every other caller of the same cache.
    pub async fn get_or_fetch(&self) -> Result<Dataset, DataError> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.stale_after {
                tracing::debug!(rows = cached.dataset.len(), "dataset cache hit");
                return Ok(cached.dataset.clone());
            }
            tracing::debug!("dataset cache entry is stale");
        }

        let rows = self.fetcher.fetch_rows().await?;
        let dataset: Dataset = std::sync::Arc::new(rows);
        *entry = Some(CacheEntry {
            dataset: dataset.clone(),
            fetched_at: Instant::now(),
        });
        Ok(dataset)
    }

    /// Drop the cached entry so the next call re-fetches.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gh_core::Row;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RowFetcher for CountingFetcher {
        async fn fetch_rows(&self) -> Result<Vec<Row>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Row::default()])
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl RowFetcher for FailingFetcher {
        async fn fetch_rows(&self) -> Result<Vec<Row>, DataError> {
            Err(DataError::Status(503))
        }
    }

    #[tokio::test]
    async fn fresh_entry_is_reused() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingFetcher {
            calls: calls.clone(),
        });

        let first = cache.get_or_fetch().await.unwrap();
        let second = cache.get_or_fetch().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn stale_entry_is_refetched() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::with_staleness(
            CountingFetcher {
                calls: calls.clone(),
            },
            Duration::ZERO,
        );

        cache.get_or_fetch().await.unwrap();
        cache.get_or_fetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingFetcher {
            calls: calls.clone(),
        });

        cache.get_or_fetch().await.unwrap();
        cache.invalidate().await;
        cache.get_or_fetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_leaves_cache_empty() {
        let cache = DatasetCache::new(FailingFetcher);
        assert!(cache.get_or_fetch().await.is_err());
        // Still empty, so the next call tries again rather than serving junk.
        assert!(cache.get_or_fetch().await.is_err());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(DatasetCache::new(CountingFetcher {
            calls: calls.clone(),
        }));

        let a = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_fetch().await })
        };
        let b = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_fetch().await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
