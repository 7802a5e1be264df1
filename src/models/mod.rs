use serde::{Deserialize, Serialize};

pub mod change;
pub mod item;

// Re-exports for convenience
pub use change::*;
pub use item::*;

/// How a target's page is fetched. Selects the fetcher/extractor pair in
/// the registry; replaces the per-site subclass zoo with a tagged variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Standard,
    Browser,
}
