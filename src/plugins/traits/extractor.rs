use crate::models::Item;

/// Trait for parsing raw HTML into item records.
///
/// Never errors across the boundary: per-listing parse failures are logged
/// and skipped inside the implementation, and each call returns a fresh
/// list. An empty list means the attempt produced nothing usable.
#[cfg_attr(test, mockall::automock)]
pub trait Extractor: Send + Sync {
    fn extract(&self, label: &str, html: &str) -> Vec<Item>;
}
