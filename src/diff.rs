//! Pure snapshot comparison: the threshold filter and the cross-run diff.
//! Classification only; rendering and delivery live in the alerter.

use std::collections::HashMap;

use crate::models::{ChangeSet, Item, Snapshot};

/// Select every item at or below `price_threshold` whose stock state
/// matches `want_in_stock`, preserving the input order.
pub fn check_threshold(items: &[Item], price_threshold: i64, want_in_stock: bool) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.price <= price_threshold && item.in_stock == want_in_stock)
        .cloned()
        .collect()
}

/// Compare two snapshots and classify what changed.
///
/// Only search labels present in both snapshots are compared; a label seen
/// for the first time has nothing to diff against, and a label dropped
/// from configuration is ignored. Within a shared label, titles are the
/// join key: new-only titles become added listings, old-only titles become
/// removed listings keyed by the old item, and titles on both sides are
/// checked for price and stock movement keyed by the new item.
pub fn diff(new: &Snapshot, old: &Snapshot) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (label, new_items) in new {
        let Some(old_items) = old.get(label) else {
            continue;
        };

        let new_by_title: HashMap<&str, &Item> = new_items
            .iter()
            .map(|item| (item.title.as_str(), item))
            .collect();
        let old_by_title: HashMap<&str, &Item> = old_items
            .iter()
            .map(|item| (item.title.as_str(), item))
            .collect();

        for (title, new_item) in &new_by_title {
            match old_by_title.get(title) {
                None => {
                    changes.entry((*new_item).clone()).or_default().listing_changed = Some(true);
                }
                Some(old_item) => {
                    let price_delta = new_item.price - old_item.price;
                    if price_delta != 0 {
                        changes.entry((*new_item).clone()).or_default().price_delta =
                            Some(price_delta);
                    }
                    if new_item.in_stock != old_item.in_stock {
                        changes.entry((*new_item).clone()).or_default().stock_changed =
                            Some(new_item.in_stock);
                    }
                }
            }
        }

        for (title, old_item) in &old_by_title {
            if !new_by_title.contains_key(title) {
                changes.entry((*old_item).clone()).or_default().listing_changed = Some(false);
            }
        }
    }

    changes
}
