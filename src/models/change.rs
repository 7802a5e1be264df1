use std::collections::HashMap;

use crate::models::Item;

/// The facets of change recorded for one item between two snapshots.
///
/// `price_delta` is new minus old. `stock_changed` carries the new stock
/// state. `listing_changed` is true for a newly appeared listing and false
/// for one that disappeared; removed listings are keyed by the old item
/// since no new item exists for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemChange {
    pub price_delta: Option<i64>,
    pub stock_changed: Option<bool>,
    pub listing_changed: Option<bool>,
}

impl ItemChange {
    pub fn is_empty(&self) -> bool {
        self.price_delta.is_none() && self.stock_changed.is_none() && self.listing_changed.is_none()
    }
}

/// Changed item -> which facets changed. Items only appear here when at
/// least one facet applies.
pub type ChangeSet = HashMap<Item, ItemChange>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_change_is_empty() {
        let change = ItemChange::default();
        assert!(change.is_empty());

        let change = ItemChange {
            price_delta: Some(-100),
            ..Default::default()
        };
        assert!(!change.is_empty());
    }
}
