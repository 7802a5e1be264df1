use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::models::Item;
use crate::plugins::extractors::{
    element_text, parse_err, parse_price, price_regex, selector, StockPolicy,
};
use crate::plugins::traits::Extractor;

/// Extractor for the sku-list markup rendered by script-heavy storefronts:
/// one `div.shop-sku-list-item` per listing, stock state in a `strong` tag.
pub struct SkuListExtractor {
    item: Selector,
    title: Selector,
    price: Selector,
    stock: Selector,
    link: Selector,
    price_re: Regex,
    policy: StockPolicy,
    link_base: Option<Url>,
}

impl SkuListExtractor {
    pub fn new(policy: StockPolicy, link_base: Option<&str>) -> crate::Result<Self> {
        let link_base = match link_base {
            Some(base) => Some(
                Url::parse(base)
                    .map_err(|e| parse_err(format!("invalid link base {base:?}: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            item: selector("div.shop-sku-list-item")?,
            title: selector("h4.sku-title")?,
            price: selector(r#"div[data-testid="customer-price"] span[aria-hidden="true"]"#)?,
            stock: selector("strong")?,
            link: selector("a")?,
            price_re: price_regex()?,
            policy,
            link_base,
        })
    }

    fn parse_listing(
        &self,
        search: &str,
        seen: DateTime<Utc>,
        card: &ElementRef,
        in_stock: bool,
    ) -> crate::Result<Item> {
        let title = card
            .select(&self.title)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| parse_err("missing sku-title"))?;

        let price_text = card
            .select(&self.price)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| parse_err("missing customer-price block"))?;
        let price = parse_price(&self.price_re, &price_text)
            .ok_or_else(|| parse_err(format!("unparseable price {price_text:?}")))?;

        let href = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| parse_err("missing listing link"))?;
        let link = match &self.link_base {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };

        Ok(Item::new(search, seen, title, price, in_stock, link))
    }
}

impl Extractor for SkuListExtractor {
    fn extract(&self, label: &str, html: &str) -> Vec<Item> {
        let seen = Utc::now();
        let document = Html::parse_document(html);

        let mut items = Vec::new();
        for card in document.select(&self.item) {
            // The stock indicator doubles as a render check: when it is
            // missing entirely, the page may not have finished loading.
            let in_stock = match card.select(&self.stock).next() {
                Some(tag) => element_text(&tag) != "Sold Out",
                None => match self.policy {
                    StockPolicy::AbortPage => {
                        warn!(
                            "[{label}] listing missing stock indicator, \
                             discarding page extraction"
                        );
                        return Vec::new();
                    }
                    StockPolicy::SkipListing => {
                        warn!("[{label}] listing missing stock indicator, skipped");
                        continue;
                    }
                },
            };

            match self.parse_listing(label, seen, &card, in_stock) {
                Ok(item) => items.push(item),
                Err(e) => warn!("[{label}] error parsing listing: {e}"),
            }
        }

        info!("[{label}] parsing complete: {} items parsed", items.len());
        if items.is_empty() {
            info!("[{label}] parsing returned no results");
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, price: &str, stock: Option<&str>) -> String {
        let stock_tag = stock
            .map(|s| format!("<strong>{s}</strong>"))
            .unwrap_or_default();
        format!(
            r#"<div class="shop-sku-list-item">
                <h4 class="sku-title">{title}</h4>
                <div data-testid="customer-price"><span aria-hidden="true">{price}</span></div>
                {stock_tag}
                <a href="/site/{title}.p">view</a>
            </div>"#
        )
    }

    #[test]
    fn test_extracts_listings_with_stock_state() {
        let page = format!(
            "{}{}",
            listing("GPU A", "$1,299.99", Some("Add to Cart")),
            listing("GPU B", "$999.00", Some("Sold Out")),
        );
        let extractor = SkuListExtractor::new(StockPolicy::AbortPage, None).unwrap();
        let items = extractor.extract("gpu", &page);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "GPU A");
        assert_eq!(items[0].price, 1300);
        assert!(items[0].in_stock);
        assert!(!items[1].in_stock);
    }

    #[test]
    fn test_missing_stock_indicator_aborts_whole_page() {
        let page = format!(
            "{}{}",
            listing("GPU A", "$1,299.99", Some("Add to Cart")),
            listing("GPU B", "$999.00", None),
        );
        let extractor = SkuListExtractor::new(StockPolicy::AbortPage, None).unwrap();
        assert!(extractor.extract("gpu", &page).is_empty());
    }

    #[test]
    fn test_skip_listing_policy_keeps_the_rest() {
        let page = format!(
            "{}{}",
            listing("GPU A", "$1,299.99", Some("Add to Cart")),
            listing("GPU B", "$999.00", None),
        );
        let extractor = SkuListExtractor::new(StockPolicy::SkipListing, None).unwrap();
        let items = extractor.extract("gpu", &page);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "GPU A");
    }

    #[test]
    fn test_relative_links_join_against_base() {
        let page = listing("gpu-a", "$500", Some("Add to Cart"));
        let extractor =
            SkuListExtractor::new(StockPolicy::AbortPage, Some("https://store.example.com"))
                .unwrap();
        let items = extractor.extract("gpu", &page);

        assert_eq!(items[0].link, "https://store.example.com/site/gpu-a.p");
    }
}
