//! One full watch run: scrape every configured target, alert, diff
//! against the previous run, persist the new snapshot.

use std::sync::Arc;

use tracing::{info, warn};

use crate::alerter::Alerter;
use crate::config::{AppConfig, TargetConfig};
use crate::diff::diff;
use crate::executor::{ScrapeExecutor, ScrapeTarget};
use crate::models::Snapshot;
use crate::plugins::manager::ScraperRegistry;
use crate::plugins::notifiers::DiscordNotifier;
use crate::plugins::traits::Notifier;
use crate::store::SnapshotStore;

pub struct Runner {
    config: AppConfig,
    registry: ScraperRegistry,
    store: SnapshotStore,
    alerter: Alerter,
}

impl Runner {
    pub fn new(config: AppConfig) -> crate::Result<Self> {
        let registry = ScraperRegistry::with_defaults(&config.scraper)?;
        let store = SnapshotStore::new(&config.storage);
        let notifier: Arc<dyn Notifier> =
            Arc::new(DiscordNotifier::new(&config.notifications.discord));
        let alerter = Alerter::new(notifier, config.notifications.discord.max_title_len);
        Ok(Self::with_parts(config, registry, store, alerter))
    }

    /// Assemble a runner from pre-built parts; used by tests to swap in
    /// stub fetchers and a recording notifier.
    pub fn with_parts(
        config: AppConfig,
        registry: ScraperRegistry,
        store: SnapshotStore,
        alerter: Alerter,
    ) -> Self {
        Self {
            config,
            registry,
            store,
            alerter,
        }
    }

    /// Process every target in configured order, then run the cross-run
    /// diff and persist the new snapshot.
    ///
    /// A target that exhausts its retries is logged and skipped; the only
    /// error that fails the whole run is being unable to save the new
    /// snapshot, since that breaks every future diff.
    pub async fn run(&self) -> crate::Result<()> {
        info!("run started, {} target(s)", self.config.targets.len());
        let mut snapshot = Snapshot::new();

        for target in &self.config.targets {
            let Some(fetcher) = self.registry.fetcher(target.kind) else {
                warn!(
                    "[{}] no fetcher registered for kind {:?}, target skipped",
                    target.name, target.kind
                );
                continue;
            };
            let Some(extractor) = self.registry.extractor(target.kind) else {
                warn!(
                    "[{}] no extractor registered for kind {:?}, target skipped",
                    target.name, target.kind
                );
                continue;
            };

            let executor = ScrapeExecutor::new(fetcher, extractor, &self.store);
            match executor.execute(&self.scrape_target(target)).await {
                Ok(items) => {
                    // Threshold alerts fire per target, before the rest of
                    // the run completes.
                    self.alerter
                        .threshold_alert(
                            &target.name,
                            &items,
                            target.price_threshold,
                            target.in_stock_alert,
                        )
                        .await;
                    // A later target with the same label overwrites the
                    // earlier capture.
                    snapshot.insert(target.name.clone(), items);
                }
                Err(e) => warn!("[{}] target skipped: {e}", target.name),
            }
        }

        if let Some(prior) = self.store.load_prior() {
            let changes = diff(&snapshot, &prior);
            self.alerter.change_alert(&changes).await;
        }

        self.store.save_prior(&snapshot)?;
        info!("run complete, {} label(s) captured", snapshot.len());
        Ok(())
    }

    fn scrape_target(&self, target: &TargetConfig) -> ScrapeTarget {
        ScrapeTarget {
            label: target.name.clone(),
            url: target.url.clone(),
            max_attempts: target
                .max_attempts
                .unwrap_or(self.config.scraper.max_attempts),
            min_retry_secs: target
                .min_retry_secs
                .unwrap_or(self.config.scraper.min_retry_secs),
            max_retry_secs: target
                .max_retry_secs
                .unwrap_or(self.config.scraper.max_retry_secs),
        }
    }
}
