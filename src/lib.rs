//! aldi-crawler - Resilient product search for Aldi Süd
//!
//! Fetches the shop's search results page and extracts the top products
//! through ordered fallback chains, so small markup changes degrade
//! gracefully instead of breaking extraction.

pub mod aldi;
pub mod commands;
pub mod config;
pub mod format;
pub mod listing;

pub use aldi::{Extractor, PageFallback, ProductRecord, SearchQuery};
pub use config::Config;
