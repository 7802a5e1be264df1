use async_trait::async_trait;

/// Trait for outbound notification delivery.
///
/// Delivery is best-effort: implementations log and swallow their own
/// failures, since a dead webhook must never abort a scrape run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str);
}
