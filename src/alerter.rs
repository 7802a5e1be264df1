//! Renders alert messages from the diff engine's classifications and
//! pushes them through the configured notifier.

use std::sync::Arc;

use tracing::{debug, info};

use crate::diff::check_threshold;
use crate::models::{ChangeSet, Item};
use crate::plugins::traits::Notifier;

pub struct Alerter {
    notifier: Arc<dyn Notifier>,
    max_title_len: usize,
}

impl Alerter {
    pub fn new(notifier: Arc<dyn Notifier>, max_title_len: usize) -> Self {
        Self {
            notifier,
            max_title_len,
        }
    }

    /// Alert on items at or below the target's price threshold with the
    /// wanted stock state. Runs right after each successful scrape.
    pub async fn threshold_alert(
        &self,
        label: &str,
        items: &[Item],
        price_threshold: i64,
        want_in_stock: bool,
    ) {
        let hits = check_threshold(items, price_threshold, want_in_stock);
        if hits.is_empty() {
            info!("[{label}] no items below price threshold");
            return;
        }

        info!(
            "[{label}] price alert: {} item(s) below configured price threshold",
            hits.len()
        );
        self.notifier
            .send(&format!(
                "⚠️ **PRICE/STOCK ALERT** ⚠️\n\
                 Search Name: [{label}]\n\
                 {} item(s) are below your configured price threshold of __${price_threshold}__",
                hits.len()
            ))
            .await;

        for item in &hits {
            self.notifier
                .send(&format!(
                    "[{}]\n\
                     • {}\n\
                     Stock {}\n\
                     ${}\n\
                     🔗 {}",
                    item.search,
                    self.clip(&item.title),
                    stock_mark(item.in_stock),
                    item.price,
                    item.md_link()
                ))
                .await;
        }
    }

    /// Alert on everything the cross-run diff classified. Each facet gets
    /// its own message so a combined price-and-stock change reads as two
    /// distinct events.
    pub async fn change_alert(&self, changes: &ChangeSet) {
        if changes.is_empty() {
            debug!("no stock/price/listing changes");
            return;
        }

        for (item, change) in changes {
            if let Some(delta) = change.price_delta {
                let direction = if delta < 0 { "⬇️" } else { "⬆️" };
                self.notifier
                    .send(&format!(
                        "⚠️ Price change ⚠️\n\
                         [{}]\n\
                         {}\n\
                         Price: {direction} from ${} by ${} to:\n\
                         --> **${}** <--\n\
                         Stock: {}\n\
                         🔗 {}",
                        item.search,
                        self.clip(&item.title),
                        item.price - delta,
                        delta.abs(),
                        item.price,
                        stock_mark(item.in_stock),
                        item.md_link()
                    ))
                    .await;
            }
            if let Some(in_stock) = change.stock_changed {
                self.notifier
                    .send(&format!(
                        "⚠️ Stock changed ⚠️\n\
                         [{}]\n\
                         {}\n\
                         Stock is now: --> {} <--\n\
                         ${}\n\
                         🔗 {}",
                        item.search,
                        self.clip(&item.title),
                        stock_mark(in_stock),
                        item.price,
                        item.md_link()
                    ))
                    .await;
            }
            if let Some(added) = change.listing_changed {
                let heading = if added {
                    "**NEW Listing**"
                } else {
                    "**REMOVED Listing**"
                };
                self.notifier
                    .send(&format!(
                        "⚠️ Listing changed ⚠️\n\
                         [{}]\n\
                         {}\n\
                         {heading}\n\
                         Stock: {}\n\
                         ${}\n\
                         🔗 {}",
                        item.search,
                        self.clip(&item.title),
                        stock_mark(item.in_stock),
                        item.price,
                        item.md_link()
                    ))
                    .await;
            }
        }
    }

    fn clip(&self, title: &str) -> String {
        if title.chars().count() > self.max_title_len {
            let clipped: String = title.chars().take(self.max_title_len).collect();
            format!("{clipped}...")
        } else {
            title.to_string()
        }
    }
}

fn stock_mark(in_stock: bool) -> &'static str {
    if in_stock {
        "✅"
    } else {
        "❌"
    }
}
