//! Product Harvester - e-commerce listing and detail page extraction
//!
//! Fetches product listing pages, discovers detail page links, and turns each
//! detail page into a key-value [`ProductRecord`](domain::product::ProductRecord).

// Module declarations
pub mod domain;
pub mod infrastructure;

pub use domain::product::{FieldValue, ProductRecord};
pub use infrastructure::{
    CrawlReport, FetchError, FetchRequest, HttpClient, ListingCrawler, PacingPolicy, PageSource,
};
