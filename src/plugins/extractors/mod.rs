use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

pub mod card_grid;
pub mod sku_list;

pub use card_grid::CardGridExtractor;
pub use sku_list::SkuListExtractor;

/// What to do when a listing's stock indicator is structurally missing.
///
/// `AbortPage` discards the entire page's extraction (returns empty), the
/// contract the sku-list markup deliberately carries: a missing indicator
/// there means the page rendered wrong, not that one card is odd.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StockPolicy {
    #[default]
    AbortPage,
    SkipListing,
}

pub(crate) fn selector(s: &str) -> crate::Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::Internal(format!("invalid selector '{s}': {e:?}")))
}

pub(crate) fn price_regex() -> crate::Result<Regex> {
    Regex::new(r"[\$£€¥₹]?\s*(\d{1,3}(?:,\d{3})*(?:\.\d+)?|\d+(?:\.\d+)?)")
        .map_err(|e| AppError::Internal(format!("invalid price regex: {e}")))
}

pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Pull the first price-looking token out of `text` and round it to the
/// smallest currency unit.
pub(crate) fn parse_price(re: &Regex, text: &str) -> Option<i64> {
    let captures = re.captures(text)?;
    let token = captures.get(1)?.as_str().replace(',', "");
    token.parse::<f64>().ok().map(|value| value.round() as i64)
}

pub(crate) fn parse_err(message: impl Into<String>) -> AppError {
    AppError::Parse {
        message: message.into(),
    }
}
