use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::models::Item;
use crate::plugins::extractors::{element_text, parse_err, parse_price, price_regex, selector};
use crate::plugins::traits::Extractor;

/// Extractor for the item-card grid markup: one `div.item-cell` per
/// listing, promo tag present when the item is out of stock.
pub struct CardGridExtractor {
    card: Selector,
    title: Selector,
    price: Selector,
    promo: Selector,
    link: Selector,
    price_re: Regex,
}

impl CardGridExtractor {
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            card: selector("div.item-cell")?,
            title: selector("a.item-title")?,
            price: selector("li.price-current strong")?,
            promo: selector("p.item-promo")?,
            link: selector("a")?,
            price_re: price_regex()?,
        })
    }

    fn parse_card(
        &self,
        search: &str,
        seen: DateTime<Utc>,
        card: &ElementRef,
    ) -> crate::Result<Item> {
        let title = card
            .select(&self.title)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| parse_err("missing item-title"))?;

        let price_text = card
            .select(&self.price)
            .next()
            .map(|el| element_text(&el))
            .ok_or_else(|| parse_err("missing price-current block"))?;
        let price = parse_price(&self.price_re, &price_text)
            .ok_or_else(|| parse_err(format!("unparseable price {price_text:?}")))?;

        // A promo tag on the card means the listing is out of stock.
        let in_stock = card.select(&self.promo).next().is_none();

        let link = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| parse_err("missing listing link"))?
            .to_string();

        Ok(Item::new(search, seen, title, price, in_stock, link))
    }
}

impl Extractor for CardGridExtractor {
    fn extract(&self, label: &str, html: &str) -> Vec<Item> {
        let seen = Utc::now();
        let document = Html::parse_document(html);

        let mut items = Vec::new();
        for card in document.select(&self.card) {
            match self.parse_card(label, seen, &card) {
                Ok(item) => items.push(item),
                // One bad card must not sink the rest of the page.
                Err(e) => warn!("[{label}] error parsing listing: {e}"),
            }
        }

        info!("[{label}] parsing complete: {} items parsed", items.len());
        items
    }
}
