//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::aldi::extractor::PageFallback;
use crate::aldi::models::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default Aldi Süd search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.aldi-sued.de/de/suchergebnis.html";

/// Default shop name stamped on every record.
pub const DEFAULT_SUPERMARKET: &str = "Aldi Süd";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search endpoint; the query is appended as `?search=`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Shop name written into each record
    #[serde(default = "default_supermarket_name")]
    pub supermarket_name: String,

    /// Maximum number of records per search
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Exponential backoff base in seconds
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Disable TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// PEM bundle with extra trusted CA certificates
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    /// Disable the whole-page title/price fallback
    #[serde(default)]
    pub strict: bool,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// JSON file with local catalog records to merge into the listing
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_supermarket_name() -> String {
    DEFAULT_SUPERMARKET.to_string()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_timeout_secs() -> u64 {
    12
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    0.6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            supermarket_name: default_supermarket_name(),
            top_n: default_top_n(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_factor: default_backoff_factor(),
            insecure: false,
            ca_file: None,
            strict: false,
            format: OutputFormat::Table,
            catalog: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("aldi-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    ///
    /// The CA bundle falls back to `REQUESTS_CA_BUNDLE`, then `ALDI_CA_FILE`,
    /// only when none is configured yet.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("ALDI_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(top_n) = std::env::var("ALDI_TOP_N") {
            if let Ok(n) = top_n.parse() {
                self.top_n = n;
            }
        }

        if let Ok(insecure) = std::env::var("ALDI_INSECURE") {
            self.insecure = matches!(insecure.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if self.ca_file.is_none() {
            self.ca_file = ["REQUESTS_CA_BUNDLE", "ALDI_CA_FILE"]
                .iter()
                .filter_map(|key| std::env::var(key).ok())
                .find(|value| !value.is_empty())
                .map(PathBuf::from);
        }

        self
    }

    /// Returns the whole-page fallback mode for the extractor.
    pub fn page_fallback(&self) -> PageFallback {
        if self.strict {
            PageFallback::Strict
        } else {
            PageFallback::Lenient
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Environment variables are process-wide; serialize the tests touching them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: [&str; 5] =
        ["ALDI_BASE_URL", "ALDI_TOP_N", "ALDI_INSECURE", "REQUESTS_CA_BUNDLE", "ALDI_CA_FILE"];

    fn with_clean_env<T>(f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = ENV_KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.aldi-sued.de/de/suchergebnis.html");
        assert_eq!(config.supermarket_name, "Aldi Süd");
        assert_eq!(config.top_n, 3);
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.retries, 3);
        assert_eq!(config.backoff_factor, 0.6);
        assert!(!config.insecure);
        assert!(config.ca_file.is_none());
        assert!(!config.strict);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_page_fallback_from_strict() {
        let mut config = Config::new();
        assert_eq!(config.page_fallback(), PageFallback::Lenient);

        config.strict = true;
        assert_eq!(config.page_fallback(), PageFallback::Strict);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            top_n = 5
            strict = true
            format = "json"
            ca_file = "/etc/ssl/corp.pem"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.top_n, 5);
        assert!(config.strict);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.ca_file, Some(PathBuf::from("/etc/ssl/corp.pem")));
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            base_url = "http://localhost:8080/search"
            supermarket_name = "Aldi Nord"
            retries = 0
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/search");
        assert_eq!(config.supermarket_name, "Aldi Nord");
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "top_n = 7").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.top_n, 7);
    }

    #[test]
    fn test_config_with_env() {
        let config = with_clean_env(|| {
            std::env::set_var("ALDI_BASE_URL", "http://proxy.local/search");
            std::env::set_var("ALDI_TOP_N", "9");
            std::env::set_var("ALDI_INSECURE", "true");
            Config::new().with_env()
        });

        assert_eq!(config.base_url, "http://proxy.local/search");
        assert_eq!(config.top_n, 9);
        assert!(config.insecure);
    }

    #[test]
    fn test_config_with_env_invalid_values() {
        let config = with_clean_env(|| {
            std::env::set_var("ALDI_TOP_N", "many");
            Config::new().with_env()
        });

        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn test_ca_file_env_fallback_order() {
        let config = with_clean_env(|| {
            std::env::set_var("REQUESTS_CA_BUNDLE", "/first.pem");
            std::env::set_var("ALDI_CA_FILE", "/second.pem");
            Config::new().with_env()
        });
        assert_eq!(config.ca_file, Some(PathBuf::from("/first.pem")));

        let config = with_clean_env(|| {
            std::env::set_var("ALDI_CA_FILE", "/second.pem");
            Config::new().with_env()
        });
        assert_eq!(config.ca_file, Some(PathBuf::from("/second.pem")));
    }

    #[test]
    fn test_ca_file_env_does_not_override_config() {
        let config = with_clean_env(|| {
            std::env::set_var("REQUESTS_CA_BUNDLE", "/env.pem");
            Config { ca_file: Some(PathBuf::from("/explicit.pem")), ..Config::new() }.with_env()
        });

        assert_eq!(config.ca_file, Some(PathBuf::from("/explicit.pem")));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config { top_n: 10, strict: true, ..Config::default() };
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.top_n, 10);
        assert!(parsed.strict);
        assert_eq!(parsed.base_url, config.base_url);
    }
}
