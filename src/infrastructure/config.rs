//! Configuration infrastructure
//!
//! Contains configuration loading and management for product harvesting.
//!
//! Configuration is organized into sections:
//! 1. Fetch settings (attempt budget, timeout, user agent)
//! 2. Pacing delays
//! 3. Listing site (base origin, URL template, page range)
//! 4. Extraction rules (selectors; edit these when the site markup changes)
//! 5. Logging

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::pacing::PacingPolicy;
use crate::infrastructure::parsing::ExtractionRules;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub pacing: PacingConfig,
    pub site: ListingSite,
    pub rules: ExtractionRules,
    pub logging: LoggingConfig,
}

/// Page fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per fetch; redirects consume attempts too
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    pub user_agent: String,
}

/// Pacing delays in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay before every fetch
    pub warmup_ms: u64,

    /// Delay between product detail fetches in a listing
    pub between_products_ms: u64,
}

impl PacingConfig {
    pub fn policy(&self) -> PacingPolicy {
        PacingPolicy::from_millis(self.warmup_ms, self.between_products_ms)
    }
}

/// Listing pages to harvest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSite {
    /// Origin used to resolve relative product links
    pub base_url: String,

    /// Listing URL with a `{page}` placeholder
    pub listing_url_template: String,

    pub first_page: u32,
    pub last_page: u32,
}

impl ListingSite {
    /// Listing URL for one page number
    pub fn listing_url(&self, page: u32) -> String {
        self.listing_url_template
            .replace(amazon_in::PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Listing URLs for the whole configured range, in page order
    pub fn listing_urls(&self) -> Vec<String> {
        (self.first_page..=self.last_page)
            .map(|page| self.listing_url(page))
            .collect()
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output (stderr; stdout is reserved for records)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_ATTEMPTS,
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            warmup_ms: defaults::WARMUP_DELAY_MS,
            between_products_ms: defaults::BETWEEN_PRODUCTS_DELAY_MS,
        }
    }
}

impl Default for ListingSite {
    fn default() -> Self {
        Self {
            base_url: amazon_in::BASE_URL.to_string(),
            listing_url_template: amazon_in::search_url_template(defaults::SEARCH_KEYWORD),
            first_page: defaults::FIRST_PAGE,
            last_page: defaults::LAST_PAGE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters.insert("product_harvester_lib".to_string(), "info".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the default configuration file location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Manager for an explicit configuration file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Configuration file not found, creating default: {:?}",
                self.config_path
            );
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file could not be parsed: {}", parse_error);

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;

                info!("Reset to default configuration");
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// amazon.in URLs and markup constants
pub mod amazon_in {
    /// Origin for resolving relative product links
    pub const BASE_URL: &str = "https://www.amazon.in";

    /// Placeholder replaced by the page number in listing templates
    pub const PAGE_PLACEHOLDER: &str = "{page}";

    /// Class string of product title links on search result pages
    pub const PRODUCT_LINK_CLASS: &str =
        "a-link-normal s-underline-text s-underline-link-text s-link-style a-text-normal";

    /// Id of the title span on detail pages
    pub const TITLE_ID: &str = "productTitle";

    /// Class of the whole-number price span
    pub const PRICE_CLASS: &str = "a-price-whole";

    /// Class of the star rating text span
    pub const RATING_TEXT_CLASS: &str = "a-icon-alt";

    pub const TECH_SPEC_TABLE_ID: &str = "productDetails_techSpec_section_1";
    pub const DETAIL_BULLETS_TABLE_ID: &str = "productDetails_detailBullets_sections1";

    /// Key cell class in both specification tables
    pub const TABLE_KEY_CLASS: &str = "a-color-secondary a-size-base prodDetSectionEntry";

    /// Value cell class in both specification tables
    pub const TABLE_VALUE_CLASS: &str = "a-size-base prodDetAttrValue";

    /// Search results URL for `keyword`, paginated via [`PAGE_PLACEHOLDER`]
    pub fn search_url_template(keyword: &str) -> String {
        format!(
            "{BASE_URL}/s?k={keyword}&page={PAGE_PLACEHOLDER}&crid=2PR9G4NVATT3&qid=1699686221&sprefix={keyword}%2Caps%2C272"
        )
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "product-harvester";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Default attempts per fetch
    pub const MAX_ATTEMPTS: u32 = 2;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 7;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Default delay before each fetch in milliseconds
    pub const WARMUP_DELAY_MS: u64 = 6_000;

    /// Default delay between product page fetches in milliseconds
    pub const BETWEEN_PRODUCTS_DELAY_MS: u64 = 10_000;

    pub const SEARCH_KEYWORD: &str = "laptop";
    pub const FIRST_PAGE: u32 = 1;
    pub const LAST_PAGE: u32 = 3;

    /// Placeholder text for absent title/price in the string-returning extractors
    pub const MISSING_TEXT_SENTINEL: &str = "No matching span element found";

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "harvest.log";
}
