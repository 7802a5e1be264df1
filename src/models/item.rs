use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product listing captured from a page.
///
/// Identity is defined over `(title, price, in_stock)` only, so the same
/// listing seen in two different runs compares equal even though `search`,
/// `timestamp`, and `link` differ. The title is the join key used to match
/// a listing across two snapshots of the same search; if a site reformats
/// its titles, the listing shows up as a remove + add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub search: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub price: i64,
    pub in_stock: bool,
    pub link: String,
}

/// One full run's capture: search label -> items found, in page order.
pub type Snapshot = BTreeMap<String, Vec<Item>>;

impl Item {
    pub fn new(
        search: impl Into<String>,
        timestamp: DateTime<Utc>,
        title: impl Into<String>,
        price: i64,
        in_stock: bool,
        link: impl Into<String>,
    ) -> Self {
        Self {
            search: search.into(),
            timestamp,
            title: title.into(),
            price,
            in_stock,
            link: link.into(),
        }
    }

    /// Link in markdown format for notification messages.
    pub fn md_link(&self) -> String {
        format!("[Link]({})", self.link)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.price == other.price && self.in_stock == other.in_stock
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.price.hash(state);
        self.in_stock.hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.chars().count() > 30 {
            let clipped: String = self.title.chars().take(30).collect();
            write!(f, "{}..., Stock: {}, ${}", clipped, self.in_stock, self.price)
        } else {
            write!(f, "{}, Stock: {}, ${}", self.title, self.in_stock, self.price)
        }
    }
}
