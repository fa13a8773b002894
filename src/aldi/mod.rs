//! Aldi Süd specific modules for fetching, locating fields, and extraction.

pub mod client;
pub mod extractor;
pub mod locators;
pub mod models;
pub mod price;
pub mod segmenter;
pub mod selectors;

pub use client::{AldiClient, FetchError, PageFetcher, RetryPolicy, TransportConfig};
pub use extractor::{Extractor, PageFallback};
pub use locators::{Hit, Locator, Strategy};
pub use models::{ProductRecord, ProductRecordBuilder, SearchQuery};
pub use price::parse_price;
pub use segmenter::{segment, Cards, Segmentation};
