//! CSS selectors and text patterns for Aldi Süd search pages.
//!
//! This file contains every selector the locators and the segmenter use.
//! Update this file when the shop changes its HTML structure.
//!
//! **Update process**: When extraction comes back empty, capture an HTML
//! sample, add the new variant as an extra strategy, and add a test fixture.

use regex_lite::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for product card containers.
pub mod card {
    use super::*;

    /// Known article container signatures, any of which marks a card.
    pub static CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "article[data-qa*='article'], \
             div[data-qa*='article'], \
             li[data-qa*='article'], \
             div.m-article-tile, \
             li.m-article-tile, \
             div.at-product-tile, \
             li.at-product-tile",
        )
        .unwrap()
    });

    /// Title elements used to synthesize cards when no container matches.
    pub static FALLBACK_TITLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "h2.at-all-productName-lbl, \
             h2[data-qa='m-article-tile__title']",
        )
        .unwrap()
    });
}

/// Selectors for the product title.
pub mod title {
    use super::*;

    pub static NAME_LABEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2.at-all-productName-lbl").unwrap());

    pub static TILE_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2[data-qa='m-article-tile__title']").unwrap());

    /// Any of the top three heading ranks; the first in document order wins.
    pub static HEADING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h1, h2, h3").unwrap());
}

/// Selectors and patterns for the price.
pub mod price {
    use super::*;

    pub static PRICE_LABEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.at-product-price_lbl").unwrap());

    pub static PRICE_PART_INLINE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span[data-qa='m-price__price-part']").unwrap());

    pub static PRICE_PART_BLOCK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div[data-qa='m-price__price-part']").unwrap());

    /// Currency symbol searched for in loose text nodes.
    pub const CURRENCY_SYMBOL: char = '€';

    /// First decimal number after German-locale normalization.
    pub static NUMBER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());
}

/// Selectors and patterns for the unit (base) price.
pub mod unit_price {
    use super::*;

    /// "3,98 €/kg", "0,40 € / 100 g", "2,49 € je kg", "per l".
    pub static TEXT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(€\s*/|\b(je|per)\s)").unwrap());

    /// Class names that mark a base-price element.
    pub static CLASS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(base-?price|reference|price-?per)").unwrap());

    pub static INLINE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span[class]").unwrap());

    pub static BLOCK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div[class]").unwrap());
}

/// Selectors for the product detail link.
pub mod link {
    use super::*;

    /// Product detail pages live under `/p/`.
    pub static DETAIL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[href*='/p/']").unwrap());

    pub static ANY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
}
