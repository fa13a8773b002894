//! aldi-crawler - Resilient product search CLI for Aldi Süd
//!
//! Extracts the top products from the shop's search results page.

use aldi_crawler::commands::SearchCommand;
use aldi_crawler::config::{Config, OutputFormat};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "aldi-crawler",
    version,
    about = "Resilient product search CLI for Aldi Süd",
    long_about = "Fetches the Aldi Süd search results page and extracts the top products \
                  through ordered fallback chains of selectors."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for products
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<usize>,

        /// Search endpoint URL
        #[arg(long, env = "ALDI_BASE_URL")]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Disable TLS certificate verification
        #[arg(long)]
        insecure: bool,

        /// PEM bundle with extra trusted CA certificates
        #[arg(long)]
        ca_file: Option<PathBuf>,

        /// Never borrow a title or price from outside a product card
        #[arg(long)]
        strict: bool,

        /// JSON catalog of local records to merge into the listing
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Search {
            query,
            max,
            base_url,
            timeout,
            insecure,
            ca_file,
            strict,
            catalog,
        } => {
            // Apply search-specific config
            if let Some(max) = max {
                config.top_n = max;
            }
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            if let Some(timeout) = timeout {
                config.timeout_secs = timeout;
            }
            if ca_file.is_some() {
                config.ca_file = ca_file;
            }
            if catalog.is_some() {
                config.catalog = catalog;
            }
            config.insecure |= insecure;
            config.strict |= strict;

            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&query).await?;
            println!("{}", output);
        }

        Commands::Config => {
            let output =
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
            print!("{}", output);
        }
    }

    Ok(())
}
