//! Search command implementation.

use crate::aldi::{AldiClient, Extractor, PageFetcher, SearchQuery, TransportConfig};
use crate::config::Config;
use crate::format::Formatter;
use crate::listing;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Executes a product search.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let transport = TransportConfig::from_config(&self.config);
        let client = AldiClient::new(&transport).context("Failed to create HTTP client")?;

        self.execute_with_fetcher(&client, query).await
    }

    /// Executes the search with a provided fetcher (for testing).
    pub async fn execute_with_fetcher(
        &self,
        fetcher: &impl PageFetcher,
        query: &str,
    ) -> Result<String> {
        let extractor = Extractor::from_config(&self.config)?;
        let search = SearchQuery::new(query).top_n(self.config.top_n);

        let mut records = extractor.search(fetcher, &search).await;
        info!("Found {} live products", records.len());

        if let Some(path) = &self.config.catalog {
            let local = listing::load_catalog(path)?;
            records = listing::merge(records, local, query);
            debug!("Combined listing has {} products", records.len());
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_records(&records))
    }
}
