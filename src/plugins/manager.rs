use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ScraperConfig;
use crate::models::TransportKind;
use crate::plugins::extractors::{CardGridExtractor, SkuListExtractor};
use crate::plugins::fetchers::{BrowserFetcher, HttpFetcher};
use crate::plugins::traits::{Extractor, Fetcher};

/// Fetcher/extractor strategies keyed by transport kind.
///
/// The orchestrator looks the pair up per target; the run fails fast at
/// startup if construction of any default strategy fails.
pub struct ScraperRegistry {
    fetchers: HashMap<TransportKind, Arc<dyn Fetcher>>,
    extractors: HashMap<TransportKind, Arc<dyn Extractor>>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self {
            fetchers: HashMap::new(),
            extractors: HashMap::new(),
        }
    }

    /// Register the built-in strategies: plain HTTP paired with the
    /// card-grid dialect, browser automation paired with the sku-list
    /// dialect.
    pub fn with_defaults(config: &ScraperConfig) -> crate::Result<Self> {
        let mut registry = Self::new();

        registry.register_fetcher(TransportKind::Standard, Arc::new(HttpFetcher::new(config)?));
        registry.register_fetcher(TransportKind::Browser, Arc::new(BrowserFetcher::new(config)));

        registry.register_extractor(TransportKind::Standard, Arc::new(CardGridExtractor::new()?));
        registry.register_extractor(
            TransportKind::Browser,
            Arc::new(SkuListExtractor::new(
                config.stock_policy,
                config.link_base.as_deref(),
            )?),
        );

        Ok(registry)
    }

    pub fn register_fetcher(&mut self, kind: TransportKind, fetcher: Arc<dyn Fetcher>) {
        self.fetchers.insert(kind, fetcher);
    }

    pub fn register_extractor(&mut self, kind: TransportKind, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(kind, extractor);
    }

    pub fn fetcher(&self, kind: TransportKind) -> Option<Arc<dyn Fetcher>> {
        self.fetchers.get(&kind).cloned()
    }

    pub fn extractor(&self, kind: TransportKind) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&kind).cloned()
    }
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        Self::new()
    }
}
