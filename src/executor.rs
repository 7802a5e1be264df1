//! The scrape-retry loop: drive fetch and extract until a non-empty item
//! list lands or the attempt budget runs out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{info, warn};

use crate::models::Item;
use crate::plugins::traits::{Extractor, Fetcher};
use crate::store::SnapshotStore;
use crate::utils::error::AppError;

/// One target's scrape descriptor: the search label, the page URL, and
/// the retry envelope.
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
    pub label: String,
    pub url: String,
    pub max_attempts: u32,
    pub min_retry_secs: u64,
    pub max_retry_secs: u64,
}

pub struct ScrapeExecutor<'a> {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    store: &'a SnapshotStore,
}

impl<'a> ScrapeExecutor<'a> {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        store: &'a SnapshotStore,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
        }
    }

    /// Run the fetch/extract cycle for one target.
    ///
    /// A transport failure or an empty extraction both count as a failed
    /// attempt; neither escapes the loop. The only success exit is a
    /// non-empty item list, which is appended to the history file before
    /// returning. Between attempts the executor sleeps a duration drawn
    /// uniformly from the target's retry bounds so repeated polls don't
    /// hit the site in lock-step.
    pub async fn execute(&self, target: &ScrapeTarget) -> crate::Result<Vec<Item>> {
        info!("[{}] scrape started", target.label);
        let started = Instant::now();

        for attempt in 1..=target.max_attempts {
            let html = match self.fetcher.fetch(&target.label, &target.url).await {
                Ok(html) => Some(html),
                Err(e) => {
                    warn!("[{}] problem requesting URL {}: {e}", target.label, target.url);
                    None
                }
            };

            let items = match html {
                Some(html) => self.extractor.extract(&target.label, &html),
                None => Vec::new(),
            };

            if !items.is_empty() {
                info!(
                    "[{}] scrape attempt {attempt}/{} successful",
                    target.label, target.max_attempts
                );
                self.store.append_history(&target.label, &items);
                info!(
                    "[{}] scrape finished in {:.1}s",
                    target.label,
                    started.elapsed().as_secs_f64()
                );
                return Ok(items);
            }

            if attempt < target.max_attempts {
                let wait_ms = rand::rng()
                    .random_range(target.min_retry_secs * 1000..=target.max_retry_secs * 1000);
                info!(
                    "[{}] scrape attempt {attempt}/{}, no items scraped, retry in {:.1}s",
                    target.label,
                    target.max_attempts,
                    wait_ms as f64 / 1000.0
                );
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
        }

        warn!(
            "[{}] scrape failed, {} attempts reached",
            target.label, target.max_attempts
        );
        info!(
            "[{}] scrape finished in {:.1}s",
            target.label,
            started.elapsed().as_secs_f64()
        );
        Err(AppError::MaxRetriesExceeded {
            label: target.label.clone(),
            attempts: target.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::Utc;
    use tempfile::{tempdir, TempDir};

    use crate::config::StorageConfig;
    use crate::plugins::traits::extractor::MockExtractor;
    use crate::plugins::traits::fetcher::MockFetcher;

    fn test_store(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(&StorageConfig {
            snapshot_file: dir.path().join("last_scrape.json").to_string_lossy().into_owned(),
            history_file: dir.path().join("history.csv").to_string_lossy().into_owned(),
            log_dir: dir.path().join("logs").to_string_lossy().into_owned(),
        })
    }

    fn target(max_attempts: u32, min_retry_secs: u64, max_retry_secs: u64) -> ScrapeTarget {
        ScrapeTarget {
            label: "gpu".to_string(),
            url: "https://example.com/products.html".to_string(),
            max_attempts,
            min_retry_secs,
            max_retry_secs,
        }
    }

    fn an_item() -> Item {
        Item::new("gpu", Utc::now(), "GPU A", 999, true, "https://example.com/a")
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_third_attempt_sleeps_twice_within_bounds() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(3)
            .returning(|_, _| Ok("<html/>".to_string()));

        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let mut extractor = MockExtractor::new();
        extractor.expect_extract().times(3).returning(move |_, _| {
            if seen.fetch_add(1, Ordering::SeqCst) + 1 < 3 {
                Vec::new()
            } else {
                vec![an_item()]
            }
        });

        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let executor = ScrapeExecutor::new(Arc::new(fetcher), Arc::new(extractor), &store);

        let clock = tokio::time::Instant::now();
        let items = executor.execute(&target(5, 10, 30)).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoff sleeps, each drawn from [10s, 30s] of virtual time.
        let elapsed = clock.elapsed();
        assert!(elapsed >= Duration::from_secs(20), "slept only {elapsed:?}");
        assert!(elapsed <= Duration::from_secs(60), "slept {elapsed:?}");
        // The success exit persists the history rows.
        assert!(dir.path().join("history.csv").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_reports_max_retries() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(3)
            .returning(|_, _| Ok("<html/>".to_string()));

        let mut extractor = MockExtractor::new();
        extractor.expect_extract().times(3).returning(|_, _| Vec::new());

        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let executor = ScrapeExecutor::new(Arc::new(fetcher), Arc::new(extractor), &store);

        let result = executor.execute(&target(3, 10, 30)).await;
        assert!(matches!(
            result,
            Err(AppError::MaxRetriesExceeded { attempts: 3, .. })
        ));
        // Nothing succeeded, so nothing was appended to history.
        assert!(!dir.path().join("history.csv").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_counts_as_empty_attempt() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|_, _| Err(AppError::Browser("chrome went away".to_string())));

        // The extractor is never handed a failed fetch's content.
        let mut extractor = MockExtractor::new();
        extractor.expect_extract().never();

        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let executor = ScrapeExecutor::new(Arc::new(fetcher), Arc::new(extractor), &store);

        let result = executor.execute(&target(2, 0, 0)).await;
        assert!(matches!(result, Err(AppError::MaxRetriesExceeded { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transport_failure() {
        let attempts = Arc::new(AtomicU32::new(0));
        let seen = attempts.clone();
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(2).returning(move |_, _| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::Browser("first fetch flaked".to_string()))
            } else {
                Ok("<html/>".to_string())
            }
        });

        let mut extractor = MockExtractor::new();
        extractor.expect_extract().times(1).returning(|_, _| vec![an_item()]);

        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let executor = ScrapeExecutor::new(Arc::new(fetcher), Arc::new(extractor), &store);

        let items = executor.execute(&target(5, 0, 0)).await.unwrap();
        assert_eq!(items, vec![an_item()]);
    }
}
