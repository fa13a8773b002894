//! Data models for search queries and extracted product records.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Default number of records returned per search.
pub const DEFAULT_TOP_N: usize = 3;

/// A product search against the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text search term, passed through unchanged (may be empty)
    pub text: String,
    /// Maximum number of records to return
    pub top_n: usize,
}

impl SearchQuery {
    /// Creates a query with the default result count.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), top_n: DEFAULT_TOP_N }
    }

    /// Sets the maximum number of records.
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// A product listing extracted from a search page, or loaded from the local
/// catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Shop the record came from
    pub supermarket_name: String,
    /// Product title as shown on the page
    pub title: String,
    /// Leading all-caps words of the title
    #[serde(default)]
    pub brand: Option<String>,
    /// Price in euros
    pub price: f64,
    /// Base price text, e.g. "1 kg = 3,98 €"
    #[serde(default)]
    pub unit_price: Option<String>,
    /// Absolute product URL (the search URL when no product link was found)
    pub url: String,
    /// True for records scraped in this run
    #[serde(default)]
    pub is_live: bool,
    /// Capture time, second precision
    pub timestamp: NaiveDateTime,
}

impl ProductRecord {
    /// Starts building a live record for the given shop.
    pub fn builder(supermarket_name: impl Into<String>) -> ProductRecordBuilder {
        ProductRecordBuilder::new(supermarket_name)
    }

    /// Returns the title without its brand prefix.
    pub fn name(&self) -> &str {
        match &self.brand {
            Some(brand) => {
                self.title.strip_prefix(brand.as_str()).map_or(self.title.as_str(), str::trim)
            }
            None => &self.title,
        }
    }
}

/// Builder for [`ProductRecord`].
///
/// `build` yields a record only once a non-empty title and a finite price are
/// set, so a record without either never exists.
#[derive(Debug, Clone)]
pub struct ProductRecordBuilder {
    supermarket_name: String,
    title: Option<String>,
    price: Option<f64>,
    unit_price: Option<String>,
    url: Option<String>,
    timestamp: Option<NaiveDateTime>,
}

impl ProductRecordBuilder {
    /// Creates an empty builder.
    pub fn new(supermarket_name: impl Into<String>) -> Self {
        Self {
            supermarket_name: supermarket_name.into(),
            title: None,
            price: None,
            unit_price: None,
            url: None,
            timestamp: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn unit_price(mut self, unit_price: Option<String>) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Overrides the capture time (defaults to now).
    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns the record, or `None` if title or price is missing.
    pub fn build(self) -> Option<ProductRecord> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let price = self.price.filter(|p| p.is_finite())?;
        let (brand, _) = split_brand(&title);
        let timestamp = self.timestamp.unwrap_or_else(|| Local::now().naive_local());

        Some(ProductRecord {
            supermarket_name: self.supermarket_name,
            brand,
            title,
            price,
            unit_price: self.unit_price,
            url: self.url.unwrap_or_default(),
            is_live: true,
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
        })
    }
}

/// Splits a title after its last fully upper-case word.
///
/// `"MILSANI Frische Vollmilch"` becomes `(Some("MILSANI"), "Frische Vollmilch")`.
/// Titles without an upper-case word have no brand.
pub fn split_brand(title: &str) -> (Option<String>, String) {
    let words: Vec<&str> = title.split_whitespace().collect();

    let Some(last_caps) = words.iter().rposition(|w| is_upper_word(w)) else {
        return (None, words.join(" "));
    };

    let brand = words[..=last_caps].join(" ");
    let name = words[last_caps + 1..].join(" ");
    (Some(brand), name)
}

/// True if the word has an upper-case letter and no lower-case one.
fn is_upper_word(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}
