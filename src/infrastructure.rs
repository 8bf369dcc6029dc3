//! Infrastructure layer for page fetching, HTML extraction, and run support
//!
//! This module provides the HTTP fetcher, the declarative extraction rules and
//! parsers, listing traversal, configuration, and logging setup.

pub mod config; // Configuration constants and file loading
pub mod crawler; // Listing traversal
pub mod fetch_error;
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod pacing;
pub mod parsing; // Extraction rules and parsers
pub mod parsing_error;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, ListingSite, amazon_in};
pub use crawler::{CrawlFailure, CrawlReport, ListingCrawler, PageSource};
pub use fetch_error::FetchError;
pub use http_client::{FetchRequest, HttpClient, HttpClientConfig};
pub use logging::{
    bootstrap_console_logging, get_log_directory, init_logging, init_logging_with_config,
};
pub use pacing::PacingPolicy;
pub use parsing::{
    ExtractionRules, ParsingError, ParsingResult, ProductDetailParser, ProductListParser,
};
