//! Extraction pipeline: page → cards → located fields → validated records.

use crate::aldi::client::PageFetcher;
use crate::aldi::locators::{resolve_link, Locator, PRICE, TITLE, UNIT_PRICE};
use crate::aldi::models::{ProductRecord, SearchQuery};
use crate::aldi::price::parse_price;
use crate::aldi::segmenter::segment;
use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_SUPERMARKET};
use anyhow::{Context, Result};
use scraper::{ElementRef, Html};
use tracing::{debug, info, trace, warn};
use url::Url;

/// Whether a card missing its own title or price may borrow one from the
/// whole page.
///
/// `Lenient` lets a single-product page without a card wrapper still yield
/// a record, but on a page of partially broken cards the same page-level
/// field can be reused for several records. `Strict` never looks outside
/// the card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageFallback {
    #[default]
    Lenient,
    Strict,
}

/// Extracts product records from Aldi search pages.
#[derive(Debug, Clone)]
pub struct Extractor {
    base_url: Url,
    supermarket_name: String,
    fallback: PageFallback,
}

impl Extractor {
    /// Creates an extractor for the default shop.
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            supermarket_name: DEFAULT_SUPERMARKET.to_string(),
            fallback: PageFallback::default(),
        }
    }

    /// Creates an extractor from the application config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;

        Ok(Self {
            base_url,
            supermarket_name: config.supermarket_name.clone(),
            fallback: config.page_fallback(),
        })
    }

    /// Sets the whole-page fallback mode.
    pub fn with_fallback(mut self, fallback: PageFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Builds the search URL: `<base>?search=<query>`, form-encoded.
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().clear().append_pair("search", query);
        url
    }

    /// Fetches the search page for `query` and extracts up to `top_n` records.
    ///
    /// Any transport failure yields an empty list; the cause is only logged.
    pub async fn search<F>(&self, fetcher: &F, query: &SearchQuery) -> Vec<ProductRecord>
    where
        F: PageFetcher + ?Sized,
    {
        if query.top_n == 0 {
            debug!("top_n is 0, skipping search");
            return Vec::new();
        }

        let url = self.search_url(&query.text);
        info!("Searching for: {:?}", query.text);

        let html = match fetcher.fetch(url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return Vec::new();
            }
        };

        let records = self.extract(&html, &url, query.top_n);

        info!("Extracted {} products", records.len());
        records
    }

    /// Extracts up to `top_n` records from a fetched page, in document order.
    ///
    /// `page_url` is the address the page was fetched from; it resolves
    /// relative links and stands in for cards without one.
    pub fn extract(&self, html: &str, page_url: &Url, top_n: usize) -> Vec<ProductRecord> {
        if top_n == 0 {
            return Vec::new();
        }

        let document = Html::parse_document(html);
        let page = document.root_element();
        let cards = segment(&document);
        debug!("Segmented page into {} cards ({:?})", cards.len(), cards.mode);

        let mut records = Vec::new();

        for card in cards.cards {
            match self.extract_card(card, page, page_url) {
                Some(record) => {
                    trace!("Extracted: {} - {:.2}", record.title, record.price);
                    records.push(record);
                }
                None => continue,
            }

            if records.len() >= top_n {
                break;
            }
        }

        records
    }

    /// Builds a record from one card, or `None` if a mandatory field is missing.
    fn extract_card(
        &self,
        card: ElementRef<'_>,
        page: ElementRef<'_>,
        page_url: &Url,
    ) -> Option<ProductRecord> {
        let Some(title) = self.locate_mandatory(&TITLE, card, page) else {
            trace!("Skipping card without title");
            return None;
        };

        let Some(price_text) = self.locate_mandatory(&PRICE, card, page) else {
            trace!("Skipping card without price: {}", title);
            return None;
        };

        let Some(price) = parse_price(&price_text) else {
            trace!("Skipping card with unparseable price {:?}: {}", price_text, title);
            return None;
        };

        let unit_price = UNIT_PRICE.locate(card).map(|hit| hit.text()).filter(|t| !t.is_empty());
        let url = resolve_link(card, &self.base_url).unwrap_or_else(|| page_url.to_string());

        ProductRecord::builder(&self.supermarket_name)
            .title(title)
            .price(price)
            .unit_price(unit_price)
            .url(url)
            .build()
    }

    /// Locates a mandatory field on the card, then on the page if allowed.
    /// Empty text counts as missing.
    fn locate_mandatory<'a>(
        &self,
        locator: &Locator,
        card: ElementRef<'a>,
        page: ElementRef<'a>,
    ) -> Option<String> {
        let on_card = locator.locate(card).map(|hit| hit.text()).filter(|t| !t.is_empty());
        if on_card.is_some() || self.fallback == PageFallback::Strict {
            return on_card;
        }

        let on_page = locator.locate(page).map(|hit| hit.text()).filter(|t| !t.is_empty());
        if on_page.is_some() {
            trace!("{} taken from whole page", locator.field());
        }
        on_page
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
