//! Listing traversal
//!
//! Fetches a listing page, discovers product links, and turns each product
//! page into a record, one request at a time. A product page that fails to
//! fetch is reported and skipped so the rest of the listing is still harvested.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::product::ProductRecord;
use crate::infrastructure::config::{AppConfig, ListingSite};
use crate::infrastructure::fetch_error::FetchError;
use crate::infrastructure::pacing::PacingPolicy;
use crate::infrastructure::parsing::{
    HtmlParser, ParsingResult, ProductDetailParser, ProductListParser,
};

/// Anything that can return the markup of a page
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// A page that could not be harvested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
}

impl CrawlFailure {
    fn new(url: &str, error: &FetchError) -> Self {
        Self {
            url: url.to_string(),
            error: error.to_string(),
        }
    }
}

/// Records in link order, plus the pages that failed
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub records: Vec<ProductRecord>,
    pub failures: Vec<CrawlFailure>,
}

impl CrawlReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }

    fn absorb(&mut self, other: CrawlReport) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }
}

/// Sequential listing crawler over a [`PageSource`]
pub struct ListingCrawler<S> {
    source: S,
    list_parser: ProductListParser,
    detail_parser: ProductDetailParser,
    pacing: PacingPolicy,
}

impl<S: PageSource> ListingCrawler<S> {
    /// Crawler with amazon.in defaults
    pub fn new(source: S, pacing: PacingPolicy) -> ParsingResult<Self> {
        Ok(Self {
            source,
            list_parser: ProductListParser::new()?,
            detail_parser: ProductDetailParser::new(),
            pacing,
        })
    }

    /// Crawler using the site, rules, and pacing of `config`
    pub fn from_app_config(source: S, config: &AppConfig) -> ParsingResult<Self> {
        Ok(Self {
            source,
            list_parser: ProductListParser::with_config(&config.rules, &config.site.base_url)?,
            detail_parser: ProductDetailParser::with_rules(config.rules.clone()),
            pacing: config.pacing.policy(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one product page and extract its record
    pub async fn scrape_product(&self, product_url: &str) -> Result<ProductRecord, FetchError> {
        let html = self.source.fetch_page(product_url).await?;
        let record = self.detail_parser.parse_from(&html, product_url);
        info!("Scraped product: {}", record.title().unwrap_or("<untitled>"));
        Ok(record)
    }

    /// Product links of one listing page
    pub async fn discover_links(&self, listing_url: &str) -> Result<Vec<String>, FetchError> {
        let html = self.source.fetch_page(listing_url).await?;
        Ok(self.list_parser.parse(&html))
    }

    /// Harvest every product linked from one listing page
    ///
    /// A failure fetching the listing itself is returned; failures on product
    /// pages are collected in the report.
    pub async fn crawl_listing(&self, listing_url: &str) -> Result<CrawlReport, FetchError> {
        let links = self.discover_links(listing_url).await?;
        info!("Listing {} has {} product links", listing_url, links.len());

        let mut report = CrawlReport::default();
        for (index, product_url) in links.iter().enumerate() {
            if index > 0 {
                self.pacing.wait_between_products().await;
            }

            match self.scrape_product(product_url).await {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    warn!("Skipping product {}: {}", product_url, e);
                    report.failures.push(CrawlFailure::new(product_url, &e));
                }
            }
        }

        Ok(report)
    }

    /// Harvest the configured page range; a failing listing page is reported and skipped
    pub async fn harvest_pages(&self, site: &ListingSite) -> CrawlReport {
        let mut report = CrawlReport::default();

        for listing_url in site.listing_urls() {
            match self.crawl_listing(&listing_url).await {
                Ok(page_report) => report.absorb(page_report),
                Err(e) => {
                    warn!("Skipping listing page {}: {}", listing_url, e);
                    report.failures.push(CrawlFailure::new(&listing_url, &e));
                }
            }
        }

        info!(
            "Harvest finished: {} records, {} failures",
            report.records.len(),
            report.failures.len()
        );
        report
    }
}
