//! Run configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional YAML file, then command-line flags.
//!
//! ```yaml
//! base_url: "https://turkishnetworktimes.com/kategori/gundem/page/{page}/"
//! total_pages: 50
//! top_k: 10
//! concurrency: 8
//! request_timeout_secs: 30
//! database_url: "postgres://localhost:5432"
//! database_name: "news_scrape"
//! chart_path: "barchart.svg"
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Placeholder substituted with the page number in [`RunConfig::base_url`].
pub const PAGE_PLACEHOLDER: &str = "{page}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub base_url: String,
    pub total_pages: u32,
    pub top_k: usize,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub database_name: String,
    pub chart_path: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "https://turkishnetworktimes.com/kategori/gundem/page/{page}/".to_string(),
            total_pages: 50,
            top_k: 10,
            concurrency: 8,
            request_timeout_secs: 30,
            database_url: "postgres://localhost:5432".to_string(),
            database_name: "news_scrape".to_string(),
            chart_path: "barchart.svg".to_string(),
        }
    }
}

impl RunConfig {
    /// Build the effective configuration from the CLI and its optional config file.
    #[instrument(level = "info", skip_all, fields(config = ?cli.config))]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                let parsed = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
                info!(%path, "Loaded configuration file");
                parsed
            }
            None => Self::default(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(v) = &cli.base_url {
            self.base_url = v.clone();
        }
        if let Some(v) = cli.total_pages {
            self.total_pages = v;
        }
        if let Some(v) = cli.top_k {
            self.top_k = v;
        }
        if let Some(v) = cli.concurrency {
            self.concurrency = v;
        }
        if let Some(v) = cli.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = &cli.database_url {
            self.database_url = v.clone();
        }
        if let Some(v) = &cli.database_name {
            self.database_name = v.clone();
        }
        if let Some(v) = &cli.chart_path {
            self.chart_path = v.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_pages == 0 {
            return Err(ConfigError::Invalid("total_pages must be at least 1".into()));
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if !self.base_url.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "base_url must contain the {PAGE_PLACEHOLDER} placeholder"
            )));
        }
        Ok(())
    }

    /// URL of the given 1-based listing page.
    pub fn page_url(&self, page: u32) -> String {
        self.base_url.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
