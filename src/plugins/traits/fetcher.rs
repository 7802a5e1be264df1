use async_trait::async_trait;

/// Trait for fetching a page and returning its raw HTML.
///
/// Implementations report transport-level failures as errors; the scrape
/// executor decides whether to retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, label: &str, url: &str) -> crate::Result<String>;
}
